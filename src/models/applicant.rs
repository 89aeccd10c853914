use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Review state of an applicant, stored and rendered as its integer code.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(try_from = "i16", into = "i16")]
#[repr(i16)]
pub enum ApproveStatus {
    #[default]
    Pending = 0,
    Approved = 1,
    Rejected = 2,
}

impl ApproveStatus {
    pub fn label(self) -> &'static str {
        match self {
            ApproveStatus::Pending => "Pending",
            ApproveStatus::Approved => "Approved",
            ApproveStatus::Rejected => "Rejected",
        }
    }
}

impl TryFrom<i16> for ApproveStatus {
    type Error = String;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ApproveStatus::Pending),
            1 => Ok(ApproveStatus::Approved),
            2 => Ok(ApproveStatus::Rejected),
            other => Err(format!("{} is not a valid approve status", other)),
        }
    }
}

impl From<ApproveStatus> for i16 {
    fn from(value: ApproveStatus) -> Self {
        value as i16
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Applicant {
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

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewApplicant {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub job_title: String,
    pub resume_url: String,
}

/// Field changes for an update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicantChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub job_title: Option<String>,
    pub resume_url: Option<String>,
    pub approve_status: Option<ApproveStatus>,
}

/// Returns the new status when an update has to stamp
/// `approve_status_changed_by`/`_at`, i.e. only on an actual value change.
pub fn status_transition(
    stored: ApproveStatus,
    incoming: Option<ApproveStatus>,
) -> Option<ApproveStatus> {
    incoming.filter(|next| *next != stored)
}

impl Applicant {
    /// Applies `changes` in place. The status stamp and `updated_at` are
    /// written together with the field changes.
    pub fn apply(&mut self, changes: ApplicantChanges, actor: Uuid, now: DateTime<Utc>) {
        let transition = status_transition(self.approve_status, changes.approve_status);

        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(email) = changes.email {
            self.email = email;
        }
        if let Some(phone) = changes.phone {
            self.phone = phone;
        }
        if let Some(job_title) = changes.job_title {
            self.job_title = job_title;
        }
        if let Some(resume_url) = changes.resume_url {
            self.resume_url = resume_url;
        }
        if let Some(next) = transition {
            self.approve_status = next;
            self.approve_status_changed_by = Some(actor);
            self.approve_status_changed_at = Some(now);
        }
        self.updated_at = now;
    }
}
