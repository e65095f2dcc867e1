/// Request logging and error envelope middleware
use crate::error::MockError;
use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::time::Instant;
use tracing::info;

/// Emit structured start and end events around every request
pub async fn log_request(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let started = Instant::now();

    info!(%method, %path, "request start");
    let response = next.run(req).await;
    info!(
        %method,
        %path,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request end"
    );

    response
}

/// Give method mismatches the same ApiError body as every other failure
pub async fn method_not_allowed(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;
    if response.status() != StatusCode::METHOD_NOT_ALLOWED {
        return response;
    }

    let allow = response.headers().get(axum::http::header::ALLOW).cloned();
    let mut response = MockError::MethodNotAllowed(format!(
        "HTTP 405 Method Not Allowed: {} {}",
        method, path
    ))
    .into_response();
    if let Some(allow) = allow {
        response.headers_mut().insert(axum::http::header::ALLOW, allow);
    }
    response
}
