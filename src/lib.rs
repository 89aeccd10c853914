pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod policy;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;

use crate::{
    config::Config,
    error::Result,
    policy::{PermissionNaming, PermissionPolicy},
    services::{
        applicant_service::{ApplicantService, PgApplicantService},
        comment_service::{CommentService, PgCommentService},
        memory_store::MemoryStore,
        user_service::{PgUserService, UserService},
    },
    utils::{links::Links, token::TokenKeys},
};
use axum::http::HeaderMap;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub applicants: Arc<dyn ApplicantService>,
    pub comments: Arc<dyn CommentService>,
    pub users: Arc<dyn UserService>,
    pub policy: PermissionPolicy,
    pub tokens: TokenKeys,
    pub public_url: Option<String>,
}

impl AppState {
    pub fn new(pool: PgPool, config: &Config) -> Result<Self> {
        Self::from_services(
            Arc::new(PgApplicantService::new(pool.clone())),
            Arc::new(PgCommentService::new(pool.clone())),
            Arc::new(PgUserService::new(pool)),
            config,
        )
    }

    pub fn in_memory(store: MemoryStore, config: &Config) -> Result<Self> {
        Self::from_services(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store),
            config,
        )
    }

    pub fn from_services(
        applicants: Arc<dyn ApplicantService>,
        comments: Arc<dyn CommentService>,
        users: Arc<dyn UserService>,
        config: &Config,
    ) -> Result<Self> {
        let naming = PermissionNaming::new(&config.permission_template)?;
        Ok(Self {
            applicants,
            comments,
            users,
            policy: PermissionPolicy::new(naming),
            tokens: TokenKeys::new(&config.jwt_secret, config.token_ttl_minutes),
            public_url: config.public_url.clone(),
        })
    }

    /// Hyperlink builder for a request: `PUBLIC_URL` when configured,
    /// otherwise the request's `Host`.
    pub fn links(&self, headers: &HeaderMap) -> Links {
        Links::resolve(self.public_url.as_deref(), headers)
    }

    /// Upserts the permission seed list into the user store.
    pub async fn seed_permissions(&self) -> Result<()> {
        self.users.seed_permissions(&self.policy.seed()).await
    }
}

/// Builds the state for the configured backend: PostgreSQL (migrated) or
/// the in-memory store. Permissions are seeded either way.
pub async fn connect(config: &Config) -> Result<AppState> {
    let state = if config.uses_memory_store() {
        tracing::warn!("using in-memory store; data is lost on exit");
        AppState::in_memory(MemoryStore::new(), config)?
    } else {
        let pool = database::pool::create_pool(config).await?;
        database::pool::run_migrations(&pool).await?;
        AppState::new(pool, config)?
    };
    state.seed_permissions().await?;
    Ok(state)
}
