/// Role and role membership endpoints
use crate::{
    api::parse_json,
    context::AppContext,
    coordinator::roles,
    error::MockResult,
    store::{Role, User},
    validation::{self, ROLE},
};
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::Serialize;
use tracing::info;

/// Build role routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/roles", get(list_roles).post(create_role))
        .route(
            "/roles/:name",
            get(get_role).put(update_role).delete(delete_role),
        )
        .route("/roles/:name/members", get(list_members))
        .route(
            "/roles/:name/members/:username",
            put(add_member).delete(remove_member),
        )
}

#[derive(Debug, Serialize)]
struct RoleList {
    roles: Vec<Role>,
    total: usize,
}

#[derive(Debug, Serialize)]
struct RoleMembers {
    role: String,
    users: Vec<User>,
}

async fn list_roles(State(ctx): State<AppContext>) -> Json<RoleList> {
    let store = ctx.store.read().await;
    let roles: Vec<Role> = store.roles.list().into_iter().cloned().collect();
    Json(RoleList {
        total: roles.len(),
        roles,
    })
}

async fn get_role(
    State(ctx): State<AppContext>,
    Path(name): Path<String>,
) -> MockResult<Json<Role>> {
    let store = ctx.store.read().await;
    Ok(Json(roles::get(&store, &name)?.clone()))
}

async fn create_role(
    State(ctx): State<AppContext>,
    body: Bytes,
) -> MockResult<(StatusCode, Json<Role>)> {
    let body = parse_json(&body)?;

    let role = ctx
        .store
        .mutate(|store| roles::create(store, validation::parse(body, &ROLE)?))
        .await?;

    info!(name = %role.name, "Created role");
    Ok((StatusCode::CREATED, Json(role)))
}

async fn update_role(
    State(ctx): State<AppContext>,
    Path(name): Path<String>,
    body: Bytes,
) -> MockResult<Json<Role>> {
    let body = parse_json(&body)?;

    let role = ctx
        .store
        .mutate(|store| roles::update(store, &name, validation::parse(body, &ROLE)?))
        .await?;

    info!(name = %name, new_name = %role.name, "Updated role");
    Ok(Json(role))
}

async fn delete_role(
    State(ctx): State<AppContext>,
    Path(name): Path<String>,
) -> MockResult<StatusCode> {
    ctx.store.mutate(|store| roles::delete(store, &name)).await?;

    info!(name = %name, "Deleted role");
    Ok(StatusCode::NO_CONTENT)
}

async fn list_members(
    State(ctx): State<AppContext>,
    Path(name): Path<String>,
) -> MockResult<Json<RoleMembers>> {
    let store = ctx.store.read().await;
    let users = roles::members(&store, &name)?
        .into_iter()
        .map(|user| User {
            password: None,
            ..user.clone()
        })
        .collect();

    Ok(Json(RoleMembers { role: name, users }))
}

async fn add_member(
    State(ctx): State<AppContext>,
    Path((name, username)): Path<(String, String)>,
) -> MockResult<StatusCode> {
    ctx.store
        .mutate(|store| roles::add_member(store, &name, &username))
        .await?;

    info!(role = %name, username = %username, "Added role member");
    Ok(StatusCode::NO_CONTENT)
}

async fn remove_member(
    State(ctx): State<AppContext>,
    Path((name, username)): Path<(String, String)>,
) -> MockResult<StatusCode> {
    ctx.store
        .mutate(|store| roles::remove_member(store, &name, &username))
        .await?;

    info!(role = %name, username = %username, "Removed role member");
    Ok(StatusCode::NO_CONTENT)
}
