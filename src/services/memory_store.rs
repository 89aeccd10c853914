//! In-process store used for tests and `DATABASE_URL=memory://`.
//!
//! Mirrors the relational rules of the PostgreSQL schema: comments cascade
//! with their applicant, user references are cleared on user removal, and
//! comments for unknown applicants are rejected.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::applicant::{Applicant, ApplicantChanges, ApproveStatus, NewApplicant};
use crate::models::comment::{ApplicantComment, NewComment};
use crate::models::user::{NewPermission, NewUser, Permission, User};
use crate::services::applicant_service::ApplicantService;
use crate::services::comment_service::CommentService;
use crate::services::user_service::UserService;

#[derive(Debug, Default)]
struct Tables {
    next_applicant_id: i64,
    next_comment_id: i64,
    next_permission_id: i32,
    applicants: BTreeMap<i64, Applicant>,
    comments: BTreeMap<i64, ApplicantComment>,
    users: HashMap<Uuid, User>,
    permissions: BTreeMap<String, Permission>,
    grants: HashMap<Uuid, HashSet<i32>>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn comment_count(&self) -> usize {
        self.tables.lock().await.comments.len()
    }
}

#[async_trait]
impl ApplicantService for MemoryStore {
    async fn create_applicant(&self, applicant: NewApplicant) -> Result<Applicant> {
        let mut tables = self.tables.lock().await;
        tables.next_applicant_id += 1;
        let now = Utc::now();
        let created = Applicant {
            id: tables.next_applicant_id,
            created_at: now,
            updated_at: now,
            name: applicant.name,
            email: applicant.email,
            phone: applicant.phone,
            job_title: applicant.job_title,
            resume_url: applicant.resume_url,
            approve_status: ApproveStatus::Pending,
            approve_status_changed_by: None,
            approve_status_changed_at: None,
        };
        tables.applicants.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_applicant(&self, id: i64) -> Result<Applicant> {
        self.tables
            .lock()
            .await
            .applicants
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Applicant {} not found", id)))
    }

    async fn list_applicants(&self) -> Result<Vec<Applicant>> {
        let tables = self.tables.lock().await;
        let mut items: Vec<Applicant> = tables.applicants.values().cloned().collect();
        items.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(items)
    }

    async fn update_applicant(
        &self,
        id: i64,
        changes: ApplicantChanges,
        actor: Uuid,
    ) -> Result<Applicant> {
        let mut tables = self.tables.lock().await;
        let applicant = tables
            .applicants
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound(format!("Applicant {} not found", id)))?;
        applicant.apply(changes, actor, Utc::now());
        Ok(applicant.clone())
    }

    async fn delete_applicant(&self, id: i64) -> Result<()> {
        let mut tables = self.tables.lock().await;
        if tables.applicants.remove(&id).is_none() {
            return Err(Error::NotFound(format!("Applicant {} not found", id)));
        }
        tables.comments.retain(|_, comment| comment.applicant_id != id);
        Ok(())
    }
}

#[async_trait]
impl CommentService for MemoryStore {
    async fn create_comment(&self, comment: NewComment) -> Result<ApplicantComment> {
        let mut tables = self.tables.lock().await;
        if !tables.applicants.contains_key(&comment.applicant_id) {
            return Err(Error::missing_applicant(comment.applicant_id));
        }
        tables.next_comment_id += 1;
        let created = ApplicantComment {
            id: tables.next_comment_id,
            created_at: Utc::now(),
            applicant_id: comment.applicant_id,
            author_id: Some(comment.author_id),
            comment: comment.comment,
        };
        tables.comments.insert(created.id, created.clone());
        Ok(created)
    }

    async fn list_comments(&self, applicant_id: i64) -> Result<Vec<ApplicantComment>> {
        let tables = self.tables.lock().await;
        let mut items: Vec<ApplicantComment> = tables
            .comments
            .values()
            .filter(|comment| comment.applicant_id == applicant_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(items)
    }
}

#[async_trait]
impl UserService for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User> {
        let mut tables = self.tables.lock().await;
        if tables.users.values().any(|u| u.username == user.username) {
            return Err(Error::Constraint(format!(
                "User {} already exists",
                user.username
            )));
        }
        let created = User {
            id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            is_active: true,
            created_at: Utc::now(),
        };
        tables.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_user(&self, id: Uuid) -> Result<User> {
        self.tables
            .lock()
            .await
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("User {} not found", id)))
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let tables = self.tables.lock().await;
        let mut users: Vec<User> = tables.users.values().cloned().collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    async fn delete_user(&self, id: Uuid) -> Result<()> {
        let mut tables = self.tables.lock().await;
        if tables.users.remove(&id).is_none() {
            return Err(Error::NotFound(format!("User {} not found", id)));
        }
        tables.grants.remove(&id);
        for applicant in tables.applicants.values_mut() {
            if applicant.approve_status_changed_by == Some(id) {
                applicant.approve_status_changed_by = None;
            }
        }
        for comment in tables.comments.values_mut() {
            if comment.author_id == Some(id) {
                comment.author_id = None;
            }
        }
        Ok(())
    }

    async fn user_permissions(&self, user_id: Uuid) -> Result<Vec<String>> {
        let tables = self.tables.lock().await;
        let Some(granted) = tables.grants.get(&user_id) else {
            return Ok(Vec::new());
        };
        Ok(tables
            .permissions
            .values()
            .filter(|p| granted.contains(&p.id))
            .map(|p| p.codename.clone())
            .collect())
    }

    async fn grant_permissions(&self, user_id: Uuid, codenames: &[String]) -> Result<()> {
        let mut tables = self.tables.lock().await;
        if !tables.users.contains_key(&user_id) {
            return Err(Error::NotFound(format!("User {} not found", user_id)));
        }
        let ids = codenames
            .iter()
            .map(|codename| {
                tables
                    .permissions
                    .get(codename)
                    .map(|p| p.id)
                    .ok_or_else(|| Error::BadRequest(format!("Unknown permission: {}", codename)))
            })
            .collect::<Result<Vec<i32>>>()?;
        tables.grants.entry(user_id).or_default().extend(ids);
        Ok(())
    }

    async fn seed_permissions(&self, permissions: &[NewPermission]) -> Result<()> {
        let mut tables = self.tables.lock().await;
        for permission in permissions {
            if tables.permissions.contains_key(&permission.codename) {
                continue;
            }
            tables.next_permission_id += 1;
            let id = tables.next_permission_id;
            tables.permissions.insert(
                permission.codename.clone(),
                Permission {
                    id,
                    codename: permission.codename.clone(),
                    name: permission.name.clone(),
                },
            );
        }
        Ok(())
    }

    async fn list_permissions(&self) -> Result<Vec<Permission>> {
        Ok(self.tables.lock().await.permissions.values().cloned().collect())
    }
}
