/// Stream endpoints
use crate::{
    api::parse_json,
    context::AppContext,
    coordinator::streams,
    error::{MockError, MockResult},
    store::{Store, Stream, StreamPatch, StreamRule},
    validation::{self, STREAM_CREATE, STREAM_RULE, STREAM_UPDATE},
};
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

/// Build stream routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/streams", get(list_streams).post(create_stream))
        .route("/streams/enabled", get(list_enabled_streams))
        .route(
            "/streams/:id",
            get(get_stream).put(update_stream).delete(delete_stream),
        )
        .route("/streams/:id/pause", post(pause_stream))
        .route("/streams/:id/resume", post(resume_stream))
}

/// A stream as the API shows it, with its rules inline
#[derive(Debug, Serialize)]
pub(crate) struct StreamView {
    #[serde(flatten)]
    stream: Stream,
    rules: Vec<StreamRule>,
}

fn render(store: &Store, stream: &Stream) -> StreamView {
    let rules = store
        .stream_rules
        .list()
        .into_iter()
        .filter(|rule| rule.stream_id == stream.id)
        .cloned()
        .collect();

    StreamView {
        stream: stream.clone(),
        rules,
    }
}

#[derive(Debug, Serialize)]
struct StreamList {
    total: usize,
    streams: Vec<StreamView>,
}

fn render_list<'a>(store: &Store, streams: impl IntoIterator<Item = &'a Stream>) -> StreamList {
    let streams: Vec<StreamView> = streams
        .into_iter()
        .map(|stream| render(store, stream))
        .collect();
    StreamList {
        total: streams.len(),
        streams,
    }
}

/// Split a create body into the stream and its initial rules
fn parse_create(body: Value) -> MockResult<(Stream, Vec<StreamRule>)> {
    let mut fields = validation::validate_body(body, &STREAM_CREATE)?;

    let rules = match fields.remove("rules") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .into_iter()
            .map(|item| {
                let rule: StreamRule = validation::parse(item, &STREAM_RULE)?;
                validation::check_stream_rule(&rule)?;
                Ok(rule)
            })
            .collect::<MockResult<Vec<_>>>()?,
        Some(_) => {
            return Err(MockError::Validation(format!(
                "Can not construct instance of {}, problem: rules must be an array",
                STREAM_CREATE.resource
            )))
        }
    };

    let stream: Stream = validation::decode(fields, &STREAM_CREATE)?;
    validation::check_explicit_id(&stream.id)?;
    Ok((stream, rules))
}

async fn list_streams(State(ctx): State<AppContext>) -> Json<StreamList> {
    let store = ctx.store.read().await;
    Json(render_list(&store, store.streams.list()))
}

async fn list_enabled_streams(State(ctx): State<AppContext>) -> Json<StreamList> {
    let store = ctx.store.read().await;
    Json(render_list(&store, streams::list_enabled(&store)))
}

async fn get_stream(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> MockResult<Json<StreamView>> {
    let store = ctx.store.read().await;
    let stream = streams::get(&store, &id)?;
    Ok(Json(render(&store, stream)))
}

async fn create_stream(
    State(ctx): State<AppContext>,
    body: Bytes,
) -> MockResult<(StatusCode, Json<StreamView>)> {
    let body = parse_json(&body)?;

    let view = ctx
        .store
        .mutate(|store| {
            let (stream, rules) = parse_create(body)?;
            let stream = streams::create(store, stream, rules)?;
            Ok(render(store, &stream))
        })
        .await?;

    info!(
        id = %view.stream.id,
        index_set_id = %view.stream.index_set_id,
        rules = view.rules.len(),
        "Created stream"
    );
    Ok((StatusCode::CREATED, Json(view)))
}

async fn update_stream(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    body: Bytes,
) -> MockResult<Json<StreamView>> {
    let body = parse_json(&body)?;

    let view = ctx
        .store
        .mutate(|store| {
            let patch: StreamPatch = validation::parse(body, &STREAM_UPDATE)?;
            validation::check_stream_patch(&patch)?;
            let stream = streams::update(store, &id, patch)?;
            Ok(render(store, &stream))
        })
        .await?;

    info!(id = %id, "Updated stream");
    Ok(Json(view))
}

async fn delete_stream(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> MockResult<StatusCode> {
    ctx.store.mutate(|store| streams::delete(store, &id)).await?;

    info!(id = %id, "Deleted stream");
    Ok(StatusCode::NO_CONTENT)
}

async fn pause_stream(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> MockResult<StatusCode> {
    ctx.store.mutate(|store| streams::pause(store, &id)).await?;

    info!(id = %id, "Paused stream");
    Ok(StatusCode::NO_CONTENT)
}

async fn resume_stream(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> MockResult<StatusCode> {
    ctx.store.mutate(|store| streams::resume(store, &id)).await?;

    info!(id = %id, "Resumed stream");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_create_splits_rules() {
        let (stream, rules) = parse_create(json!({
            "title": "Errors",
            "index_set_id": "abc",
            "matching_type": "OR",
            "rules": [{"field": "level", "type": 1, "value": "3"}]
        }))
        .unwrap();

        assert_eq!(stream.title, "Errors");
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].field, "level");
    }

    #[test]
    fn test_parse_create_rejects_route_shadowing_id() {
        let result = parse_create(json!({"id": "enabled", "title": "x", "index_set_id": "a"}));
        assert!(matches!(result, Err(MockError::Validation(_))));
    }

    #[test]
    fn test_parse_create_rejects_bad_rules() {
        assert!(parse_create(json!({"title": "x", "index_set_id": "a", "rules": {}})).is_err());
        assert!(parse_create(json!({
            "title": "x",
            "index_set_id": "a",
            "rules": [{"field": "level", "type": 42}]
        }))
        .is_err());
    }
}
