/// Stream rule endpoints, always addressed through their stream
use crate::{
    api::parse_json,
    context::AppContext,
    coordinator::streams,
    error::MockResult,
    store::StreamRule,
    validation::{self, STREAM_RULE},
};
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

/// Build stream rule routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/streams/:id/rules", get(list_rules).post(create_rule))
        .route(
            "/streams/:id/rules/:rule_id",
            get(get_rule).put(update_rule).delete(delete_rule),
        )
}

#[derive(Debug, Serialize)]
struct StreamRuleList {
    total: usize,
    stream_rules: Vec<StreamRule>,
}

fn parse_rule(body: Value) -> MockResult<StreamRule> {
    let rule: StreamRule = validation::parse(body, &STREAM_RULE)?;
    validation::check_stream_rule(&rule)?;
    Ok(rule)
}

async fn list_rules(
    State(ctx): State<AppContext>,
    Path(stream_id): Path<String>,
) -> MockResult<Json<StreamRuleList>> {
    let store = ctx.store.read().await;
    let stream_rules: Vec<StreamRule> = streams::rules(&store, &stream_id)?
        .into_iter()
        .cloned()
        .collect();

    Ok(Json(StreamRuleList {
        total: stream_rules.len(),
        stream_rules,
    }))
}

async fn get_rule(
    State(ctx): State<AppContext>,
    Path((stream_id, rule_id)): Path<(String, String)>,
) -> MockResult<Json<StreamRule>> {
    let store = ctx.store.read().await;
    Ok(Json(streams::get_rule(&store, &stream_id, &rule_id)?.clone()))
}

async fn create_rule(
    State(ctx): State<AppContext>,
    Path(stream_id): Path<String>,
    body: Bytes,
) -> MockResult<(StatusCode, Json<StreamRule>)> {
    let body = parse_json(&body)?;

    let rule = ctx
        .store
        .mutate(|store| streams::create_rule(store, &stream_id, parse_rule(body)?))
        .await?;

    info!(stream_id = %stream_id, rule_id = %rule.id, "Created stream rule");
    Ok((StatusCode::CREATED, Json(rule)))
}

async fn update_rule(
    State(ctx): State<AppContext>,
    Path((stream_id, rule_id)): Path<(String, String)>,
    body: Bytes,
) -> MockResult<Json<StreamRule>> {
    let body = parse_json(&body)?;

    let rule = ctx
        .store
        .mutate(|store| streams::update_rule(store, &stream_id, &rule_id, parse_rule(body)?))
        .await?;

    info!(stream_id = %stream_id, rule_id = %rule_id, "Updated stream rule");
    Ok(Json(rule))
}

async fn delete_rule(
    State(ctx): State<AppContext>,
    Path((stream_id, rule_id)): Path<(String, String)>,
) -> MockResult<StatusCode> {
    ctx.store
        .mutate(|store| streams::delete_rule(store, &stream_id, &rule_id))
        .await?;

    info!(stream_id = %stream_id, rule_id = %rule_id, "Deleted stream rule");
    Ok(StatusCode::NO_CONTENT)
}
