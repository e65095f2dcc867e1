/// API routes and handlers
pub mod alerts;
pub mod index_sets;
pub mod inputs;
pub mod middleware;
pub mod roles;
pub mod stream_rules;
pub mod streams;
pub mod users;

use crate::{
    context::AppContext,
    error::{MockError, MockResult},
};
use axum::{body::Bytes, Router};
use serde_json::Value;

/// Build API routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .merge(users::routes())
        .merge(roles::routes())
        .merge(index_sets::routes())
        .merge(streams::routes())
        .merge(stream_rules::routes())
        .merge(inputs::routes())
        .merge(alerts::routes())
}

/// Decode a raw request body; schema checks happen later in `validation`
pub(crate) fn parse_json(body: &Bytes) -> MockResult<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(MockError::Validation("Request body is empty".to_string()));
    }
    serde_json::from_slice(body)
        .map_err(|e| MockError::Validation(format!("Malformed JSON request body: {}", e)))
}
