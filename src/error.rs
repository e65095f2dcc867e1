/// Unified error types for the Graylog mock server
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the mock server
#[derive(Error, Debug)]
pub enum MockError {
    /// Malformed, missing or unknown fields, and dangling references on write
    #[error("{0}")]
    Validation(String),

    /// Another resource of the same kind already uses the unique key
    #[error("{0}")]
    Duplicate(String),

    /// Unknown identifier
    #[error("{0}")]
    NotFound(String),

    /// Path exists but not for this HTTP method
    #[error("{0}")]
    MethodNotAllowed(String),

    /// Business-rule conflict (default index set, read-only role, references)
    #[error("{0}")]
    Conflict(String),

    /// Snapshot could not be written or read
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding errors outside of request decoding
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MockError {
    pub fn status(&self) -> StatusCode {
        match self {
            MockError::Validation(_) | MockError::Duplicate(_) => StatusCode::BAD_REQUEST,
            MockError::NotFound(_) => StatusCode::NOT_FOUND,
            MockError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            MockError::Conflict(_) => StatusCode::CONFLICT,
            MockError::Persistence(_)
            | MockError::Internal(_)
            | MockError::Io(_)
            | MockError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error body used by every Graylog REST endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
}

impl ApiErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            kind: "ApiError".to_string(),
            message: message.into(),
        }
    }
}

/// Convert MockError to HTTP response
impl IntoResponse for MockError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            "Internal server error".to_string() // Don't leak details
        } else {
            self.to_string()
        };

        (status, Json(ApiErrorBody::new(message))).into_response()
    }
}

/// Result type alias for mock server operations
pub type MockResult<T> = Result<T, MockError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(MockError::Validation("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(MockError::Duplicate("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(MockError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(MockError::Conflict("x".into()).status(), StatusCode::CONFLICT);
        assert_eq!(
            MockError::MethodNotAllowed("x".into()).status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            MockError::Persistence("disk full".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_body_shape() {
        let body = serde_json::to_value(ApiErrorBody::new("No user found with name bob")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"type": "ApiError", "message": "No user found with name bob"})
        );
    }
}
