use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::{Error, Result};
use crate::models::applicant::{Applicant, ApplicantChanges, ApproveStatus, NewApplicant};
use crate::utils::links::Links;

/// Server-assigned keys (id, timestamps, status and its stamp) are not
/// declared here, so serde drops them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CreateApplicantPayload {
    #[validate(required, length(min = 1, max = 254))]
    pub name: Option<String>,
    #[validate(required, email, length(max = 254))]
    pub email: Option<String>,
    #[validate(required, length(min = 1, max = 15))]
    pub phone: Option<String>,
    #[validate(required, length(min = 1, max = 254))]
    pub job_title: Option<String>,
    #[validate(required, url, length(max = 254))]
    pub resume_url: Option<String>,
}

impl CreateApplicantPayload {
    /// Call after `validate()`; missing fields fall back to empty strings.
    pub fn into_new_applicant(self) -> NewApplicant {
        NewApplicant {
            name: self.name.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            phone: self.phone.unwrap_or_default(),
            job_title: self.job_title.unwrap_or_default(),
            resume_url: self.resume_url.unwrap_or_default(),
        }
    }
}

/// Body of PUT (full) and PATCH (partial) updates. `approve_status_changed_*`
/// and other read-only keys are dropped by serde.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateApplicantPayload {
    #[validate(length(min = 1, max = 254))]
    pub name: Option<String>,
    #[validate(email, length(max = 254))]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 15))]
    pub phone: Option<String>,
    #[validate(length(min = 1, max = 254))]
    pub job_title: Option<String>,
    #[validate(url, length(max = 254))]
    pub resume_url: Option<String>,
    #[validate(range(min = 0, max = 2))]
    pub approve_status: Option<i16>,
}

impl UpdateApplicantPayload {
    /// A full update must carry every creator-supplied field.
    pub fn ensure_complete(&self) -> Result<()> {
        let mut errors = ValidationErrors::new();
        let fields = [
            ("name", self.name.is_none()),
            ("email", self.email.is_none()),
            ("phone", self.phone.is_none()),
            ("job_title", self.job_title.is_none()),
            ("resume_url", self.resume_url.is_none()),
        ];
        for (field, missing) in fields {
            if missing {
                errors.add(field, ValidationError::new("required"));
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(errors))
        }
    }

    pub fn into_changes(self) -> Result<ApplicantChanges> {
        let approve_status = self
            .approve_status
            .map(ApproveStatus::try_from)
            .transpose()
            .map_err(Error::BadRequest)?;
        Ok(ApplicantChanges {
            name: self.name,
            email: self.email,
            phone: self.phone,
            job_title: self.job_title,
            resume_url: self.resume_url,
            approve_status,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicantResponse {
    pub url: String,
    pub comments: String,
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub job_title: String,
    pub resume_url: String,
    pub approve_status: ApproveStatus,
    pub approve_status_changed_by: Option<Uuid>,
    pub approve_status_changed_at: Option<DateTime<Utc>>,
}

impl ApplicantResponse {
    pub fn new(value: Applicant, links: &Links) -> Self {
        Self {
            url: links.applicant(value.id),
            comments: links.applicant_comments(value.id),
            id: value.id,
            created_at: value.created_at,
            updated_at: value.updated_at,
            name: value.name,
            email: value.email,
            phone: value.phone,
            job_title: value.job_title,
            resume_url: value.resume_url,
            approve_status: value.approve_status,
            approve_status_changed_by: value.approve_status_changed_by,
            approve_status_changed_at: value.approve_status_changed_at,
        }
    }
}
