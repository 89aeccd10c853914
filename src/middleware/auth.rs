use std::collections::HashSet;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use uuid::Uuid;

use crate::{error::Error, AppState};

/// The authenticated identity a request acts as.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub username: String,
    pub permissions: HashSet<String>,
}

impl CurrentUser {
    pub fn has_permission(&self, codename: &str) -> bool {
        self.permissions.contains(codename)
    }
}

fn unauthorized(code: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "error": code }))).into_response()
}

/// Resolves the bearer token to an active user and their permission set.
pub async fn require_user(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let Some(auth_header) = req.headers().get(axum::http::header::AUTHORIZATION) else {
        return unauthorized("missing_authorization");
    };
    let Ok(auth_str) = auth_header.to_str() else {
        return unauthorized("bad_authorization");
    };
    let Some(token) = auth_str.strip_prefix("Bearer ") else {
        return unauthorized("unsupported_scheme");
    };

    let Ok(user_id) = state.tokens.verify(token.trim()) else {
        return unauthorized("invalid_token");
    };

    let user = match state.users.get_user(user_id).await {
        Ok(user) => user,
        Err(Error::NotFound(_)) => return unauthorized("invalid_token"),
        Err(err) => return err.into_response(),
    };
    if !user.is_active {
        return unauthorized("inactive_user");
    }

    let permissions = match state.users.user_permissions(user.id).await {
        Ok(permissions) => permissions,
        Err(err) => return err.into_response(),
    };

    req.extensions_mut().insert(CurrentUser {
        id: user.id,
        username: user.username,
        permissions: permissions.into_iter().collect(),
    });
    next.run(req).await
}
