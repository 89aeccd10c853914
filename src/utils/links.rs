use axum::http::{header::HOST, HeaderMap};
use uuid::Uuid;

/// Absolute hyperlinks for API resources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Links {
    base: String,
}

impl Links {
    pub fn new(base: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    /// Prefers the configured public URL and falls back to the `Host` header.
    pub fn resolve(public_url: Option<&str>, headers: &HeaderMap) -> Self {
        if let Some(url) = public_url {
            return Self::new(url);
        }
        let host = headers
            .get(HOST)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("localhost");
        Self::new(&format!("http://{}", host))
    }

    pub fn applicant(&self, id: i64) -> String {
        format!("{}/api/applicants/{}/", self.base, id)
    }

    pub fn applicant_comments(&self, id: i64) -> String {
        format!("{}/api/applicants/{}/comments/", self.base, id)
    }

    pub fn user(&self, id: Uuid) -> String {
        format!("{}/api/users/{}/", self.base, id)
    }
}
