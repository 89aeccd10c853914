use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::{json, Map, Value as JsonValue};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    /// A referential or uniqueness constraint rejected the write.
    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// Body is not JSON or does not match the payload's field types.
    #[error("Invalid request body: {0}")]
    Body(#[from] JsonRejection),

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn missing_applicant(id: i64) -> Self {
        Error::Constraint(format!("Applicant {} does not exist", id))
    }
}

fn validation_body(err: &validator::ValidationErrors) -> JsonValue {
    let fields: Map<String, JsonValue> = err
        .field_errors()
        .into_iter()
        .map(|(field, errors)| {
            let codes: Vec<String> = errors.iter().map(|e| e.code.to_string()).collect();
            (field.to_string(), json!(codes))
        })
        .collect();
    json!({ "error": "Validation failed", "fields": fields })
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        if let Error::Validation(err) = &self {
            return (StatusCode::BAD_REQUEST, Json(validation_body(err))).into_response();
        }

        let (status, error_message) = match self {
            Error::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Error::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            Error::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            Error::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Error::MethodNotAllowed(msg) => (StatusCode::METHOD_NOT_ALLOWED, msg),
            Error::Constraint(msg) => (StatusCode::BAD_REQUEST, msg),
            Error::Body(rejection) => (StatusCode::BAD_REQUEST, rejection.body_text()),
            Error::Token(_) => (StatusCode::UNAUTHORIZED, "invalid_token".to_string()),
            Error::Database(err) => {
                tracing::error!(error = %err, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error".to_string(),
                )
            }
            Error::Internal(msg) => {
                tracing::error!(error = %msg, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An unexpected error occurred".to_string(),
            ),
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Error::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                Error::Constraint("Referenced resource does not exist".to_string())
            }
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Error::Constraint("Resource already exists".to_string())
            }
            other => Error::Database(other),
        }
    }
}
