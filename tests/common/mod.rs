#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    response::Response,
};
use applicant_tracker::{
    config::{Config, LogFormat, MEMORY_DATABASE_URL},
    models::user::NewUser,
    policy::PermissionNaming,
    routes,
    services::memory_store::MemoryStore,
    utils::crypto::hash_password,
    AppState,
};
use serde_json::Value as JsonValue;
use tower::ServiceExt;

pub const PASSWORD: &str = "s3cret-pass";

pub fn config() -> Config {
    Config {
        server_address: "127.0.0.1:0".into(),
        database_url: MEMORY_DATABASE_URL.into(),
        database_max_connections: 1,
        jwt_secret: "test_secret_key".into(),
        token_ttl_minutes: 60,
        permission_template: PermissionNaming::DEFAULT_TEMPLATE.into(),
        public_url: Some("http://testserver".into()),
        log_format: LogFormat::Pretty,
    }
}

pub struct TestApp {
    pub state: AppState,
    pub store: MemoryStore,
}

pub struct TestUser {
    pub id: uuid::Uuid,
    pub token: String,
}

impl TestApp {
    pub async fn new() -> Self {
        let store = MemoryStore::new();
        let state = AppState::in_memory(store.clone(), &config()).expect("state");
        state.seed_permissions().await.expect("seed permissions");
        Self { state, store }
    }

    /// Creates an active user holding `permissions` and returns a bearer token for it.
    pub async fn user(&self, username: &str, permissions: &[&str]) -> TestUser {
        let user = self
            .state
            .users
            .create_user(NewUser {
                username: username.into(),
                email: format!("{}@example.com", username),
                password_hash: Some(hash_password(PASSWORD).expect("hash")),
            })
            .await
            .expect("create user");
        let codenames: Vec<String> = permissions.iter().map(|p| p.to_string()).collect();
        self.state
            .users
            .grant_permissions(user.id, &codenames)
            .await
            .expect("grant permissions");
        let token = self.state.tokens.issue(user.id).expect("token");
        TestUser { id: user.id, token }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, JsonValue) {
        let response = routes::app(self.state.clone())
            .oneshot(request)
            .await
            .expect("response");
        read_json(response).await
    }
}

pub async fn read_json(response: Response) -> (StatusCode, JsonValue) {
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let body = if bytes.is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, body)
}

pub fn request(method: &str, uri: &str, token: Option<&str>, body: Option<JsonValue>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    }
}

pub fn john_doe() -> JsonValue {
    serde_json::json!({
        "name": "John Doe",
        "email": "john.doe@example.com",
        "phone": "123-456-7890",
        "job_title": "Software Engineer",
        "resume_url": "https://example.com/resume.pdf"
    })
}
