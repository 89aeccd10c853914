pub mod applicants;
pub mod auth;
pub mod comments;
pub mod health;
pub mod users;

use axum::{
    routing::{get, post},
    Router,
};
use tower::Layer;
use tower_http::{
    normalize_path::{NormalizePath, NormalizePathLayer},
    trace::TraceLayer,
};

use crate::{middleware, AppState};

/// Route table. Everything under `/api` except the token endpoint needs a
/// bearer token.
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route(
            "/api/applicants",
            get(applicants::list_applicants).post(applicants::create_applicant),
        )
        .route(
            "/api/applicants/:id",
            get(applicants::get_applicant)
                .put(applicants::replace_applicant)
                .patch(applicants::patch_applicant),
        )
        .route(
            "/api/applicants/:id/comments",
            get(comments::list_comments).post(comments::create_comment),
        )
        .route("/api/users", get(users::list_users))
        .route("/api/users/:id", get(users::get_user))
        .route("/api/permissions", get(users::list_permissions))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_user,
        ));

    Router::new()
        .route("/health", get(health::health))
        .route("/api/auth/token", post(auth::issue_token))
        .merge(protected)
        .with_state(state)
}

/// The served application: the route table with CORS and tracing, accepting
/// paths with or without a trailing slash.
pub fn app(state: AppState) -> NormalizePath<Router> {
    let router = router(state)
        .layer(middleware::cors::api_cors())
        .layer(TraceLayer::new_for_http());
    NormalizePathLayer::trim_trailing_slash().layer(router)
}
