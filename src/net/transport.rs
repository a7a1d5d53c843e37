//! HTTP transport seam.
//!
//! DESIGN
//! ======
//! Clients build plain [`HttpRequest`] values and read plain [`HttpResponse`]
//! values so status handling can be exercised without a live server. The
//! production transport is a thin `reqwest` wrapper; no timeout is set beyond
//! the `reqwest` defaults.

use reqwest::Method;
use reqwest::header::{ACCEPT, CONTENT_TYPE};

pub const JSON: &str = "application/json";
pub const JSON_LD: &str = "application/ld+json";
pub const MERGE_PATCH: &str = "application/merge-patch+json";

/// Transport-level failure: nothing usable came back from the server.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    /// Path relative to the API base URL, starting with `/`.
    pub path: String,
    pub bearer: Option<String>,
    pub accept: &'static str,
    pub content_type: Option<&'static str>,
    pub body: Option<serde_json::Value>,
}

impl HttpRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            bearer: None,
            accept: JSON_LD,
            content_type: None,
            body: None,
        }
    }

    #[must_use]
    pub fn bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    #[must_use]
    pub fn accept(mut self, accept: &'static str) -> Self {
        self.accept = accept;
        self
    }

    #[must_use]
    pub fn json_body(mut self, content_type: &'static str, body: serde_json::Value) -> Self {
        self.content_type = Some(content_type);
        self.body = Some(body);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body parsed as JSON, or `None` when empty or not JSON.
    #[must_use]
    pub fn json(&self) -> Option<serde_json::Value> {
        if self.body.trim().is_empty() {
            return None;
        }
        serde_json::from_str(&self.body).ok()
    }
}

/// Sends one request and returns whatever status came back.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// # Errors
    ///
    /// Returns a [`TransportError`] when no HTTP response was received.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// `reqwest`-backed transport rooted at the API base URL.
pub struct ReqwestTransport {
    http: reqwest::Client,
    base_url: String,
}

impl ReqwestTransport {
    /// # Errors
    ///
    /// Returns a [`TransportError`] if the HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| TransportError::new(format!("http client build failed: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = format!("{}{}", self.base_url, request.path);
        tracing::debug!(method = %request.method, %url, "api request");

        let mut builder = self.http.request(request.method, &url).header(ACCEPT, request.accept);
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            let content_type = request.content_type.unwrap_or(JSON);
            let raw = serde_json::to_vec(body).map_err(|e| TransportError::new(e.to_string()))?;
            builder = builder.header(CONTENT_TYPE, content_type).body(raw);
        }

        let response = builder.send().await.map_err(|e| TransportError::new(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| TransportError::new(e.to_string()))?;
        tracing::debug!(status, %url, "api response");
        Ok(HttpResponse { status, body })
    }
}
