use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::user::{Permission, User};
use crate::utils::links::Links;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub url: String,
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub permissions: Vec<String>,
}

impl UserResponse {
    pub fn new(user: User, permissions: Vec<String>, links: &Links) -> Self {
        Self {
            url: links.user(user.id),
            id: user.id,
            username: user.username,
            email: user.email,
            permissions,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionResponse {
    pub id: i32,
    pub codename: String,
    pub name: String,
}

impl From<Permission> for PermissionResponse {
    fn from(value: Permission) -> Self {
        Self {
            id: value.id,
            codename: value.codename,
            name: value.name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TokenRequest {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}
