/// HTTP server setup and routing
use crate::{
    api::middleware::{log_request, method_not_allowed},
    context::AppContext,
    error::{MockError, MockResult},
};
use axum::{
    http::{header, Method, Uri},
    middleware, Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

/// Build the main application router
/// Returns Router<()> because state is already provided
pub fn build_router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]);

    // axum cannot nest at "/", so an empty base path mounts the routes directly
    let base_path = ctx.config.service.base_path.as_str();
    let router = if base_path.is_empty() {
        Router::new().merge(crate::api::routes())
    } else {
        Router::new().nest(base_path, crate::api::routes())
    };

    router
        .fallback(not_found)
        .with_state(ctx)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(middleware::from_fn(log_request))
                .layer(middleware::from_fn(method_not_allowed)),
        )
}

/// 404 handler
async fn not_found(uri: Uri) -> MockError {
    MockError::NotFound(format!("HTTP 404 Not Found: {}", uri.path()))
}

/// Start the HTTP server
pub async fn serve(ctx: AppContext) -> MockResult<()> {
    let addr = format!("{}:{}", ctx.config.service.hostname, ctx.config.service.port);

    info!("Graylog mock server listening on {}", addr);
    info!("   Service URL: {}", ctx.service_url());

    let app = build_router(ctx);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| MockError::Internal(format!("Failed to bind to {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| MockError::Internal(format!("Server error: {}", e)))?;

    Ok(())
}
