use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::{Error, Result};
use crate::models::comment::{ApplicantComment, NewComment};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentService: Send + Sync {
    /// Inserts without checking the applicant first; an unknown applicant
    /// is rejected by the store as `Error::Constraint`.
    async fn create_comment(&self, comment: NewComment) -> Result<ApplicantComment>;

    /// Comments for one applicant, oldest first.
    async fn list_comments(&self, applicant_id: i64) -> Result<Vec<ApplicantComment>>;
}

#[derive(Clone)]
pub struct PgCommentService {
    pool: PgPool,
}

impl PgCommentService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentService for PgCommentService {
    async fn create_comment(&self, comment: NewComment) -> Result<ApplicantComment> {
        let applicant_id = comment.applicant_id;
        sqlx::query_as::<_, ApplicantComment>(
            r#"
            INSERT INTO applicant_comments (applicant_id, author_id, comment)
            VALUES ($1, $2, $3)
            RETURNING id, created_at, applicant_id, author_id, comment
            "#,
        )
        .bind(comment.applicant_id)
        .bind(comment.author_id)
        .bind(comment.comment)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| match err {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                Error::missing_applicant(applicant_id)
            }
            other => other.into(),
        })
    }

    async fn list_comments(&self, applicant_id: i64) -> Result<Vec<ApplicantComment>> {
        let items = sqlx::query_as::<_, ApplicantComment>(
            r#"
            SELECT id, created_at, applicant_id, author_id, comment
            FROM applicant_comments
            WHERE applicant_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(applicant_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }
}
