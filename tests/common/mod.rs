//! Shared helpers for driving the router in-process
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use graylog_mock::{
    config::ServerConfig,
    context::AppContext,
    persistence::{MemorySnapshotBackend, SnapshotBackend},
    server::build_router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

/// Router over a fresh in-memory store, mounted under `/api`
pub async fn app() -> Router {
    app_with_backend(Arc::new(MemorySnapshotBackend::default())).await
}

pub async fn app_with_backend(backend: Arc<dyn SnapshotBackend>) -> Router {
    build_router(context(ServerConfig::default(), backend).await)
}

pub async fn context(config: ServerConfig, backend: Arc<dyn SnapshotBackend>) -> AppContext {
    AppContext::with_backend(config, backend)
        .await
        .expect("context should open")
}

/// Send one request and decode the JSON response body (Null when empty)
pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };

    (status, value)
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

pub async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn put(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::PUT, uri, Some(body)).await
}

pub async fn delete(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::DELETE, uri, None).await
}

pub fn alice() -> Value {
    json!({
        "username": "alice",
        "email": "a@x.com",
        "permissions": [],
        "full_name": "Alice",
        "password": "pw"
    })
}

pub fn index_set(title: &str, prefix: &str) -> Value {
    json!({
        "title": title,
        "description": "test index set",
        "index_prefix": prefix,
        "shards": 1,
        "replicas": 0,
        "rotation_strategy_class": "org.graylog2.indexer.rotation.strategies.MessageCountRotationStrategy",
        "rotation_strategy": {
            "type": "org.graylog2.indexer.rotation.strategies.MessageCountRotationStrategyConfig",
            "max_docs_per_index": 20000000
        },
        "retention_strategy_class": "org.graylog2.indexer.retention.strategies.DeletionRetentionStrategy",
        "retention_strategy": {
            "type": "org.graylog2.indexer.retention.strategies.DeletionRetentionStrategyConfig",
            "max_number_of_indices": 20
        },
        "index_analyzer": "standard",
        "index_optimization_max_num_segments": 1,
        "index_optimization_disabled": false,
        "field_type_refresh_interval": 5000,
        "writable": true
    })
}

/// Id of the index set currently flagged default
pub async fn default_index_set_id(app: &Router) -> String {
    let (_, body) = get(app, "/api/system/indices/index_sets").await;
    body["index_sets"]
        .as_array()
        .unwrap()
        .iter()
        .find(|index_set| index_set["default"] == json!(true))
        .and_then(|index_set| index_set["id"].as_str())
        .unwrap()
        .to_string()
}

pub fn assert_api_error(body: &Value) {
    assert_eq!(body["type"], "ApiError");
    assert!(body["message"].is_string());
}
