use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::applicant::{Applicant, ApplicantChanges, NewApplicant};

const APPLICANT_COLUMNS: &str = "id, created_at, updated_at, name, email, phone, job_title, \
     resume_url, approve_status, approve_status_changed_by, approve_status_changed_at";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApplicantService: Send + Sync {
    async fn create_applicant(&self, applicant: NewApplicant) -> Result<Applicant>;

    async fn get_applicant(&self, id: i64) -> Result<Applicant>;

    /// All applicants, oldest first.
    async fn list_applicants(&self) -> Result<Vec<Applicant>>;

    /// Applies `changes` and, when the approve status actually changes,
    /// stamps `actor` and the current time in the same write.
    async fn update_applicant(
        &self,
        id: i64,
        changes: ApplicantChanges,
        actor: Uuid,
    ) -> Result<Applicant>;

    /// Removes the applicant together with its comments.
    async fn delete_applicant(&self, id: i64) -> Result<()>;
}

#[derive(Clone)]
pub struct PgApplicantService {
    pool: PgPool,
}

impl PgApplicantService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn not_found(id: i64) -> Error {
    Error::NotFound(format!("Applicant {} not found", id))
}

#[async_trait]
impl ApplicantService for PgApplicantService {
    async fn create_applicant(&self, applicant: NewApplicant) -> Result<Applicant> {
        let sql = format!(
            r#"
            INSERT INTO applicants (name, email, phone, job_title, resume_url)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            APPLICANT_COLUMNS
        );
        let created = sqlx::query_as::<_, Applicant>(&sql)
            .bind(applicant.name)
            .bind(applicant.email)
            .bind(applicant.phone)
            .bind(applicant.job_title)
            .bind(applicant.resume_url)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn get_applicant(&self, id: i64) -> Result<Applicant> {
        let sql = format!("SELECT {} FROM applicants WHERE id = $1", APPLICANT_COLUMNS);
        sqlx::query_as::<_, Applicant>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found(id))
    }

    async fn list_applicants(&self) -> Result<Vec<Applicant>> {
        let sql = format!(
            "SELECT {} FROM applicants ORDER BY created_at ASC, id ASC",
            APPLICANT_COLUMNS
        );
        let items = sqlx::query_as::<_, Applicant>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    async fn update_applicant(
        &self,
        id: i64,
        changes: ApplicantChanges,
        actor: Uuid,
    ) -> Result<Applicant> {
        // Right-hand sides see the pre-update row, so the stamp compares
        // against the stored status.
        let sql = format!(
            r#"
            UPDATE applicants
            SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                phone = COALESCE($4, phone),
                job_title = COALESCE($5, job_title),
                resume_url = COALESCE($6, resume_url),
                approve_status = COALESCE($7::SMALLINT, approve_status),
                approve_status_changed_by = CASE
                    WHEN $7::SMALLINT IS NOT NULL AND $7::SMALLINT <> approve_status THEN $8::UUID
                    ELSE approve_status_changed_by
                END,
                approve_status_changed_at = CASE
                    WHEN $7::SMALLINT IS NOT NULL AND $7::SMALLINT <> approve_status THEN NOW()
                    ELSE approve_status_changed_at
                END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            APPLICANT_COLUMNS
        );
        let updated = sqlx::query_as::<_, Applicant>(&sql)
            .bind(id)
            .bind(changes.name)
            .bind(changes.email)
            .bind(changes.phone)
            .bind(changes.job_title)
            .bind(changes.resume_url)
            .bind(changes.approve_status.map(i16::from))
            .bind(actor)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found(id))?;
        Ok(updated)
    }

    async fn delete_applicant(&self, id: i64) -> Result<()> {
        let res = sqlx::query("DELETE FROM applicants WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }
}
