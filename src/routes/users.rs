use axum::{
    extract::{Path, State},
    http::{HeaderMap, Method},
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;

use crate::{
    dto::user_dto::{PermissionResponse, UserResponse},
    error::Result,
    middleware::auth::CurrentUser,
    policy::{Action, Resource},
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "Users with their permissions", body = [UserResponse]),
        (status = 403, description = "Missing view permission")
    )
)]
#[axum::debug_handler]
pub async fn list_users(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    method: Method,
    headers: HeaderMap,
) -> Result<impl IntoResponse> {
    state.policy.authorize_method(&user, &method, Resource::User, Action::Read)?;
    let links = state.links(&headers);

    let users = state.users.list_users().await?;
    let mut items = Vec::with_capacity(users.len());
    for listed in users {
        let permissions = state.users.user_permissions(listed.id).await?;
        items.push(UserResponse::new(listed, permissions, &links));
    }
    Ok(Json(items))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User found", body = Json<UserResponse>),
        (status = 403, description = "Missing view permission"),
        (status = 404, description = "User not found")
    )
)]
#[axum::debug_handler]
pub async fn get_user(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    method: Method,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.policy.authorize_method(&user, &method, Resource::User, Action::Read)?;
    let links = state.links(&headers);

    let found = state.users.get_user(id).await?;
    let permissions = state.users.user_permissions(found.id).await?;
    Ok(Json(UserResponse::new(found, permissions, &links)))
}

#[utoipa::path(
    get,
    path = "/api/permissions",
    responses(
        (status = 200, description = "Seeded permissions", body = [PermissionResponse]),
        (status = 403, description = "Missing view permission")
    )
)]
#[axum::debug_handler]
pub async fn list_permissions(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    method: Method,
) -> Result<impl IntoResponse> {
    state.policy.authorize_method(&user, &method, Resource::User, Action::Read)?;

    let items: Vec<PermissionResponse> = state
        .users
        .list_permissions()
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(Json(items))
}
