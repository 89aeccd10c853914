use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Json},
    Extension,
};
use validator::Validate;

use crate::{
    dto::comment_dto::{CommentResponse, CreateCommentPayload},
    error::Result,
    middleware::auth::CurrentUser,
    models::comment::NewComment,
    policy::{Action, Resource},
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/applicants/{id}/comments",
    params(
        ("id" = i64, Path, description = "Applicant ID")
    ),
    request_body = CreateCommentPayload,
    responses(
        (status = 201, description = "Comment created", body = Json<CommentResponse>),
        (status = 400, description = "Invalid payload or unknown applicant"),
        (status = 403, description = "Missing add permission")
    )
)]
#[axum::debug_handler]
pub async fn create_comment(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    headers: HeaderMap,
    Path(applicant_id): Path<i64>,
    payload: std::result::Result<Json<CreateCommentPayload>, JsonRejection>,
) -> Result<impl IntoResponse> {
    state
        .policy
        .authorize(&user, Resource::ApplicantComment, Action::Create)?;
    let Json(payload) = payload?;
    let links = state.links(&headers);
    payload.validate()?;

    // Applicant comes from the path and author from the token, never the body.
    let comment = state
        .comments
        .create_comment(NewComment {
            applicant_id,
            author_id: user.id,
            comment: payload.comment.unwrap_or_default(),
        })
        .await?;
    tracing::info!(
        applicant_id,
        comment_id = comment.id,
        user = %user.username,
        "comment created"
    );
    Ok((
        StatusCode::CREATED,
        Json(CommentResponse::new(comment, &links)),
    ))
}

#[utoipa::path(
    get,
    path = "/api/applicants/{id}/comments",
    params(
        ("id" = i64, Path, description = "Applicant ID")
    ),
    responses(
        (status = 200, description = "Comments, oldest first", body = [CommentResponse]),
        (status = 403, description = "Missing view permission")
    )
)]
#[axum::debug_handler]
pub async fn list_comments(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    method: Method,
    headers: HeaderMap,
    Path(applicant_id): Path<i64>,
) -> Result<impl IntoResponse> {
    state
        .policy
        .authorize_method(&user, &method, Resource::ApplicantComment, Action::Read)?;
    let links = state.links(&headers);
    let items: Vec<CommentResponse> = state
        .comments
        .list_comments(applicant_id)
        .await?
        .into_iter()
        .map(|comment| CommentResponse::new(comment, &links))
        .collect();
    Ok(Json(items))
}
