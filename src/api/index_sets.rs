/// Index set endpoints
use crate::{
    api::parse_json,
    context::AppContext,
    coordinator::index_sets,
    error::{MockError, MockResult},
    stats,
    store::{IndexSet, IndexSetStats},
    validation::{self, INDEX_SET},
};
use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

/// Build index set routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route(
            "/system/indices/index_sets",
            get(list_index_sets).post(create_index_set),
        )
        .route("/system/indices/index_sets/stats", get(total_stats))
        .route(
            "/system/indices/index_sets/:id",
            get(get_index_set)
                .put(update_index_set)
                .delete(delete_index_set),
        )
        .route("/system/indices/index_sets/:id/default", put(set_default))
        .route("/system/indices/index_sets/:id/stats", get(index_set_stats))
}

#[derive(Debug, Default, Deserialize)]
struct ListQuery {
    #[serde(default)]
    skip: usize,
    /// 0 returns everything after `skip`
    #[serde(default)]
    limit: usize,
    #[serde(default)]
    stats: bool,
}

#[derive(Debug, Serialize)]
struct IndexSetList {
    total: usize,
    index_sets: Vec<IndexSet>,
    stats: BTreeMap<String, IndexSetStats>,
}

async fn list_index_sets(
    State(ctx): State<AppContext>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> MockResult<Json<IndexSetList>> {
    let Query(query) = query.map_err(|e| MockError::Validation(e.body_text()))?;
    let store = ctx.store.read().await;
    let index_sets: Vec<IndexSet> = index_sets::list(&store, query.skip, query.limit)
        .into_iter()
        .cloned()
        .collect();

    let stats = if query.stats {
        let all = stats::stats_for_all(&store);
        index_sets
            .iter()
            .filter_map(|index_set| {
                all.get(&index_set.id)
                    .map(|stats| (index_set.id.clone(), *stats))
            })
            .collect()
    } else {
        BTreeMap::new()
    };

    Ok(Json(IndexSetList {
        total: store.index_sets.len(),
        index_sets,
        stats,
    }))
}

async fn get_index_set(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> MockResult<Json<IndexSet>> {
    let store = ctx.store.read().await;
    Ok(Json(index_sets::get(&store, &id)?.clone()))
}

async fn create_index_set(
    State(ctx): State<AppContext>,
    body: Bytes,
) -> MockResult<Json<IndexSet>> {
    let body = parse_json(&body)?;

    let index_set = ctx
        .store
        .mutate(|store| {
            let index_set: IndexSet = validation::parse(body, &INDEX_SET)?;
            validation::check_index_set(&index_set)?;
            index_sets::create(store, index_set)
        })
        .await?;

    info!(
        id = %index_set.id,
        prefix = %index_set.index_prefix,
        default = index_set.default,
        "Created index set"
    );
    Ok(Json(index_set))
}

async fn update_index_set(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    body: Bytes,
) -> MockResult<Json<IndexSet>> {
    let body = parse_json(&body)?;

    let index_set = ctx
        .store
        .mutate(|store| {
            let index_set: IndexSet = validation::parse(body, &INDEX_SET)?;
            validation::check_index_set(&index_set)?;
            index_sets::update(store, &id, index_set)
        })
        .await?;

    info!(id = %index_set.id, "Updated index set");
    Ok(Json(index_set))
}

async fn delete_index_set(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> MockResult<StatusCode> {
    ctx.store
        .mutate(|store| index_sets::delete(store, &id))
        .await?;

    info!(id = %id, "Deleted index set");
    Ok(StatusCode::NO_CONTENT)
}

async fn set_default(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> MockResult<Json<IndexSet>> {
    let index_set = ctx
        .store
        .mutate(|store| index_sets::set_default(store, &id))
        .await?;

    info!(id = %id, "Changed default index set");
    Ok(Json(index_set))
}

async fn index_set_stats(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> MockResult<Json<IndexSetStats>> {
    let store = ctx.store.read().await;
    Ok(Json(stats::stats_for(&store, &id)?))
}

async fn total_stats(State(ctx): State<AppContext>) -> Json<IndexSetStats> {
    let store = ctx.store.read().await;
    Json(stats::total(&store))
}
