use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Json},
    Extension,
};
use validator::Validate;

use crate::{
    dto::applicant_dto::{ApplicantResponse, CreateApplicantPayload, UpdateApplicantPayload},
    error::Result,
    middleware::auth::CurrentUser,
    policy::{Action, Resource},
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/applicants",
    request_body = CreateApplicantPayload,
    responses(
        (status = 201, description = "Applicant created", body = Json<ApplicantResponse>),
        (status = 400, description = "Invalid payload"),
        (status = 403, description = "Missing add permission")
    )
)]
#[axum::debug_handler]
pub async fn create_applicant(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    headers: HeaderMap,
    payload: std::result::Result<Json<CreateApplicantPayload>, JsonRejection>,
) -> Result<impl IntoResponse> {
    state
        .policy
        .authorize(&user, Resource::Applicant, Action::Create)?;
    let Json(payload) = payload?;
    let links = state.links(&headers);
    payload.validate()?;

    let applicant = state
        .applicants
        .create_applicant(payload.into_new_applicant())
        .await?;
    tracing::info!(applicant_id = applicant.id, user = %user.username, "applicant created");
    Ok((
        StatusCode::CREATED,
        Json(ApplicantResponse::new(applicant, &links)),
    ))
}

#[utoipa::path(
    get,
    path = "/api/applicants",
    responses(
        (status = 200, description = "Applicants, oldest first", body = [ApplicantResponse]),
        (status = 403, description = "Missing view permission")
    )
)]
#[axum::debug_handler]
pub async fn list_applicants(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    method: Method,
    headers: HeaderMap,
) -> Result<impl IntoResponse> {
    state
        .policy
        .authorize_method(&user, &method, Resource::Applicant, Action::Read)?;
    let links = state.links(&headers);
    let items: Vec<ApplicantResponse> = state
        .applicants
        .list_applicants()
        .await?
        .into_iter()
        .map(|applicant| ApplicantResponse::new(applicant, &links))
        .collect();
    Ok(Json(items))
}

#[utoipa::path(
    get,
    path = "/api/applicants/{id}",
    params(
        ("id" = i64, Path, description = "Applicant ID")
    ),
    responses(
        (status = 200, description = "Applicant found", body = Json<ApplicantResponse>),
        (status = 403, description = "Missing view permission"),
        (status = 404, description = "Applicant not found")
    )
)]
#[axum::debug_handler]
pub async fn get_applicant(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    method: Method,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    state
        .policy
        .authorize_method(&user, &method, Resource::Applicant, Action::Read)?;
    let links = state.links(&headers);
    let applicant = state.applicants.get_applicant(id).await?;
    Ok(Json(ApplicantResponse::new(applicant, &links)))
}

#[utoipa::path(
    put,
    path = "/api/applicants/{id}",
    params(
        ("id" = i64, Path, description = "Applicant ID")
    ),
    request_body = UpdateApplicantPayload,
    responses(
        (status = 200, description = "Applicant replaced", body = Json<ApplicantResponse>),
        (status = 400, description = "Invalid or incomplete payload"),
        (status = 403, description = "Missing change permission"),
        (status = 404, description = "Applicant not found")
    )
)]
#[axum::debug_handler]
pub async fn replace_applicant(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    payload: std::result::Result<Json<UpdateApplicantPayload>, JsonRejection>,
) -> Result<impl IntoResponse> {
    state
        .policy
        .authorize(&user, Resource::Applicant, Action::Update)?;
    let Json(payload) = payload?;
    let links = state.links(&headers);
    payload.ensure_complete()?;
    payload.validate()?;

    // Stamps the acting user when approve_status actually changes.
    let applicant = state
        .applicants
        .update_applicant(id, payload.into_changes()?, user.id)
        .await?;
    tracing::info!(
        applicant_id = id,
        status = applicant.approve_status.label(),
        user = %user.username,
        "applicant replaced"
    );
    Ok(Json(ApplicantResponse::new(applicant, &links)))
}

#[utoipa::path(
    patch,
    path = "/api/applicants/{id}",
    params(
        ("id" = i64, Path, description = "Applicant ID")
    ),
    request_body = UpdateApplicantPayload,
    responses(
        (status = 200, description = "Applicant updated", body = Json<ApplicantResponse>),
        (status = 400, description = "Invalid payload"),
        (status = 403, description = "Missing change permission"),
        (status = 404, description = "Applicant not found")
    )
)]
#[axum::debug_handler]
pub async fn patch_applicant(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    payload: std::result::Result<Json<UpdateApplicantPayload>, JsonRejection>,
) -> Result<impl IntoResponse> {
    state
        .policy
        .authorize(&user, Resource::Applicant, Action::Update)?;
    let Json(payload) = payload?;
    let links = state.links(&headers);
    payload.validate()?;

    // Stamps the acting user when approve_status actually changes.
    let applicant = state
        .applicants
        .update_applicant(id, payload.into_changes()?, user.id)
        .await?;
    tracing::info!(
        applicant_id = id,
        status = applicant.approve_status.label(),
        user = %user.username,
        "applicant updated"
    );
    Ok(Json(ApplicantResponse::new(applicant, &links)))
}
