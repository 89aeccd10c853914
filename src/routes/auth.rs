use axum::{
    extract::{rejection::JsonRejection, State},
    response::{IntoResponse, Json},
};
use validator::Validate;

use crate::{
    dto::user_dto::{TokenRequest, TokenResponse},
    error::{Error, Result},
    utils::crypto::verify_password,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/auth/token",
    request_body = TokenRequest,
    responses(
        (status = 200, description = "Access token issued", body = Json<TokenResponse>),
        (status = 401, description = "Invalid credentials")
    )
)]
#[axum::debug_handler]
pub async fn issue_token(
    State(state): State<AppState>,
    payload: std::result::Result<Json<TokenRequest>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(payload) = payload?;
    payload.validate()?;

    let invalid = || Error::Unauthorized("invalid_credentials".to_string());
    let user = state
        .users
        .find_user_by_username(&payload.username)
        .await?
        .ok_or_else(invalid)?;

    let password_ok = user
        .password_hash
        .as_deref()
        .map(|hash| verify_password(&payload.password, hash))
        .unwrap_or(false);
    if !password_ok || !user.is_active {
        tracing::warn!(username = %payload.username, "rejected token request");
        return Err(invalid());
    }

    let access_token = state.tokens.issue(user.id)?;
    tracing::info!(user = %user.username, "issued access token");
    Ok(Json(TokenResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: state.tokens.ttl_seconds(),
    }))
}
