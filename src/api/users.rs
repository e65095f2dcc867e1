/// User endpoints
use crate::{
    api::parse_json,
    context::AppContext,
    coordinator::users,
    error::MockResult,
    store::{User, UserPatch},
    validation::{self, USER_CREATE, USER_UPDATE},
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

/// Build user routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/:username",
            get(get_user).put(update_user).delete(delete_user),
        )
}

/// Passwords are write-only
fn render(user: &User) -> User {
    User {
        password: None,
        ..user.clone()
    }
}

#[derive(Debug, Serialize)]
struct UserList {
    users: Vec<User>,
}

async fn list_users(State(ctx): State<AppContext>) -> Json<UserList> {
    let store = ctx.store.read().await;
    let users = store.users.list().into_iter().map(render).collect();
    Json(UserList { users })
}

async fn get_user(
    State(ctx): State<AppContext>,
    Path(username): Path<String>,
) -> MockResult<Json<User>> {
    let store = ctx.store.read().await;
    Ok(Json(render(users::get(&store, &username)?)))
}

async fn create_user(
    State(ctx): State<AppContext>,
    body: Bytes,
) -> MockResult<(StatusCode, Json<User>)> {
    let body = parse_json(&body)?;

    let user = ctx
        .store
        .mutate(|store| {
            let user: User = validation::parse(body, &USER_CREATE)?;
            validation::check_user(&user)?;
            users::create(store, user)
        })
        .await?;

    info!(username = %user.username, id = %user.id, "Created user");
    Ok((StatusCode::CREATED, Json(render(&user))))
}

async fn update_user(
    State(ctx): State<AppContext>,
    Path(username): Path<String>,
    body: Bytes,
) -> MockResult<Json<User>> {
    let body = parse_json(&body)?;

    let user = ctx
        .store
        .mutate(|store| {
            let patch: UserPatch = validation::parse(body, &USER_UPDATE)?;
            if let Some(email) = patch.email.as_deref() {
                validation::check_email(email)?;
            }
            users::update(store, &username, patch)
        })
        .await?;

    info!(username = %user.username, "Updated user");
    Ok(Json(render(&user)))
}

async fn delete_user(
    State(ctx): State<AppContext>,
    Path(username): Path<String>,
) -> MockResult<StatusCode> {
    ctx.store
        .mutate(|store| users::delete(store, &username))
        .await?;

    info!(username = %username, "Deleted user");
    Ok(StatusCode::NO_CONTENT)
}
