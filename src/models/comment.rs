use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApplicantComment {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub applicant_id: i64,
    pub author_id: Option<Uuid>,
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub applicant_id: i64,
    pub author_id: Uuid,
    pub comment: String,
}
