use crate::{
    api::parse_json,
    context::AppContext,
    coordinator::inputs,
    error::MockResult,
    store::Input,
    validation::{self, INPUT_CREATE, INPUT_UPDATE},
};
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tracing::info;

/// Build input routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/system/inputs", get(list_inputs).post(create_input))
        .route(
            "/system/inputs/:id",
            get(get_input).put(update_input).delete(delete_input),
        )
}

#[derive(Debug, Serialize)]
struct InputList {
    inputs: Vec<Input>,
    total: usize,
}

async fn list_inputs(State(ctx): State<AppContext>) -> Json<InputList> {
    let store = ctx.store.read().await;
    let inputs: Vec<Input> = store.inputs.list().into_iter().cloned().collect();
    Json(InputList {
        total: inputs.len(),
        inputs,
    })
}

async fn get_input(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> MockResult<Json<Input>> {
    let store = ctx.store.read().await;
    Ok(Json(inputs::get(&store, &id)?.clone()))
}

async fn create_input(
    State(ctx): State<AppContext>,
    body: Bytes,
) -> MockResult<(StatusCode, Json<Input>)> {
    let body = parse_json(&body)?;

    let input = ctx
        .store
        .mutate(|store| {
            let input: Input = validation::parse(body, &INPUT_CREATE)?;
            validation::check_explicit_id(&input.id)?;
            inputs::create(store, input)
        })
        .await?;

    info!(id = %input.id, input_type = %input.input_type, "Created input");
    Ok((StatusCode::CREATED, Json(input)))
}

async fn update_input(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    body: Bytes,
) -> MockResult<Json<Input>> {
    let body = parse_json(&body)?;

    let input = ctx
        .store
        .mutate(|store| inputs::update(store, &id, validation::parse(body, &INPUT_UPDATE)?))
        .await?;

    info!(id = %id, "Updated input");
    Ok(Json(input))
}

async fn delete_input(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> MockResult<StatusCode> {
    ctx.store.mutate(|store| inputs::delete(store, &id)).await?;

    info!(id = %id, "Deleted input");
    Ok(StatusCode::NO_CONTENT)
}
