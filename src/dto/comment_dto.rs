use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::comment::ApplicantComment;
use crate::utils::links::Links;

/// Only the text is client-supplied; `applicant` and `author` keys in the
/// body are dropped.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CreateCommentPayload {
    #[validate(required, length(min = 1))]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentResponse {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub applicant: String,
    pub author: Option<String>,
    pub comment: String,
}

impl CommentResponse {
    pub fn new(value: ApplicantComment, links: &Links) -> Self {
        Self {
            id: value.id,
            created_at: value.created_at,
            applicant: links.applicant(value.applicant_id),
            author: value.author_id.map(|id| links.user(id)),
            comment: value.comment,
        }
    }
}
