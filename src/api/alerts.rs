/// Alert condition endpoints
use crate::context::AppContext;
use axum::{routing::get, Json, Router};
use serde::Serialize;
use serde_json::Value;

/// Build alert routes
pub fn routes() -> Router<AppContext> {
    Router::new().route("/alerts/conditions", get(list_conditions))
}

#[derive(Debug, Default, Serialize)]
struct ConditionList {
    conditions: Vec<Value>,
    total: usize,
}

/// No alert conditions are ever configured on the mock
async fn list_conditions() -> Json<ConditionList> {
    Json(ConditionList::default())
}
