//! Shared fixtures for unit tests: token minting and a scripted transport.

use std::collections::VecDeque;
use std::sync::Mutex;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::{Value, json};

use crate::net::transport::{HttpRequest, HttpResponse, Transport, TransportError};

/// 2030-01-01T00:00:00Z in epoch seconds.
pub const FAR_FUTURE_SECS: i64 = 1_893_456_000;

/// 2020-01-01T00:00:00Z in epoch seconds.
pub const LONG_AGO_SECS: i64 = 1_577_836_800;

/// Wall-clock used by tests: 2025-01-01T00:00:00Z in milliseconds.
pub const NOW_MS: i64 = 1_735_689_600_000;

/// Build an unsigned-looking token around `payload`.
pub fn make_token(payload: &Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#);
    let body = URL_SAFE_NO_PAD.encode(payload.to_string());
    format!("{header}.{body}.signature")
}

pub fn admin_token() -> String {
    make_token(&json!({
        "username": "admin@example.com",
        "roles": ["ROLE_ADMIN", "ROLE_USER"],
        "firstName": "Ada",
        "iat": LONG_AGO_SECS,
        "exp": FAR_FUTURE_SECS,
    }))
}

pub fn user_token() -> String {
    make_token(&json!({
        "username": "user@example.com",
        "roles": ["ROLE_USER"],
        "iat": LONG_AGO_SECS,
        "exp": FAR_FUTURE_SECS,
    }))
}

pub fn expired_token() -> String {
    make_token(&json!({
        "username": "old@example.com",
        "roles": ["ROLE_USER"],
        "iat": LONG_AGO_SECS - 3600,
        "exp": LONG_AGO_SECS,
    }))
}

/// Transport replaying canned responses in order and recording requests.
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    pub requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new(responses: Vec<Result<HttpResponse, TransportError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(status: u16, body: Value) -> Self {
        Self::new(vec![Ok(HttpResponse::new(status, body.to_string()))])
    }

    pub fn empty(status: u16) -> Self {
        Self::new(vec![Ok(HttpResponse::new(status, String::new()))])
    }

    pub fn failing() -> Self {
        Self::new(vec![Err(TransportError::new("connection refused"))])
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> HttpRequest {
        self.requests.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait::async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::new("no scripted response left")))
    }
}
