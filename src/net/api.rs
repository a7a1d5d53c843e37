//! REST clients for the portfolio API.
//!
//! `ProjectsClient` covers the `projects` resource and always sends the stored
//! bearer token. `AuthClient` covers sign-in, registration and the sign-out
//! notification, which run without (or regardless of) a session.
//!
//! ERROR HANDLING
//! ==============
//! Every failure is an [`ApiError`]; nothing here retries, and nothing here
//! touches the session. Reacting to `Unauthorized` is the caller's job.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::sync::Arc;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::{ApiError, generic_failure_message};
use super::transport::{HttpRequest, HttpResponse, JSON, JSON_LD, MERGE_PATCH, Transport};
use super::types::{
    ContactMessage, Credentials, NewProject, Project, ProjectPatch, Registration, error_message_in, unwrap_collection,
    violations_in,
};
use crate::util::token_store::TokenStore;

pub const PROJECTS_PATH: &str = "/api/projects";
pub const AUTH_PATH: &str = "/api/auth";
pub const USERS_PATH: &str = "/api/users";
pub const LOGOUT_PATH: &str = "/logout";
pub const CONTACT_PATH: &str = "/api/contact";

fn project_endpoint(id: i64) -> String {
    format!("{PROJECTS_PATH}/{id}")
}

fn login_failed_message(status: u16) -> String {
    format!("login failed with status {status}")
}

fn registration_failed_message(status: u16) -> String {
    format!("registration failed with status {status}")
}

/// Map a non-success response onto the error taxonomy.
///
/// `404` only becomes [`ApiError::NotFound`] when `not_found_is_distinct`;
/// elsewhere it is an ordinary failed request.
fn status_error(response: &HttpResponse, not_found_is_distinct: bool) -> ApiError {
    match response.status {
        401 => ApiError::Unauthorized,
        404 if not_found_is_distinct => ApiError::NotFound,
        status => {
            let body = response.json().unwrap_or(Value::Null);
            if let Some(violations) = violations_in(&body).filter(|v| !v.is_empty()) {
                return ApiError::ValidationFailed(violations);
            }
            let message = error_message_in(&body).unwrap_or_else(|| generic_failure_message(status));
            ApiError::RequestFailed { status, message }
        }
    }
}

fn parse_body<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
    serde_json::from_str(&response.body).map_err(|e| ApiError::Decode(e.to_string()))
}

fn to_json<T: serde::Serialize>(payload: &T) -> Result<Value, ApiError> {
    serde_json::to_value(payload).map_err(|e| ApiError::Decode(e.to_string()))
}

// =============================================================================
// PROJECTS
// =============================================================================

/// Authenticated client for `/api/projects`.
#[derive(Clone)]
pub struct ProjectsClient {
    transport: Arc<dyn Transport>,
    store: Arc<dyn TokenStore>,
}

impl ProjectsClient {
    pub fn new(transport: Arc<dyn Transport>, store: Arc<dyn TokenStore>) -> Self {
        Self { transport, store }
    }

    /// Send `request` with the stored token attached.
    ///
    /// Fails with [`ApiError::AuthenticationRequired`] before any network
    /// activity when no token is stored.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let token = self.store.read().ok_or(ApiError::AuthenticationRequired)?;
        let request = request.bearer(token);
        let method = request.method.clone();
        let path = request.path.clone();
        let response = self.transport.send(request).await.map_err(|e| {
            tracing::warn!(%method, %path, error = %e, "projects request failed");
            ApiError::from(e)
        })?;
        tracing::debug!(%method, %path, status = response.status, "projects response");
        Ok(response)
    }

    /// Fetch every project, in server order.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] for a missing token, a non-success status or an
    /// unreadable collection body.
    pub async fn list(&self) -> Result<Vec<Project>, ApiError> {
        let response = self.send(HttpRequest::new(Method::GET, PROJECTS_PATH)).await?;
        if !response.is_success() {
            return Err(status_error(&response, false));
        }
        let body: Value = parse_body(&response)?;
        unwrap_collection(body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Fetch one project.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] on 404, otherwise as [`Self::list`].
    pub async fn get(&self, id: i64) -> Result<Project, ApiError> {
        let response = self.send(HttpRequest::new(Method::GET, project_endpoint(id))).await?;
        if !response.is_success() {
            return Err(status_error(&response, true));
        }
        parse_body(&response)
    }

    /// Create a project and return the server's copy.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ValidationFailed`] when the API lists violations,
    /// otherwise as [`Self::list`].
    pub async fn create(&self, payload: &NewProject) -> Result<Project, ApiError> {
        let request = HttpRequest::new(Method::POST, PROJECTS_PATH).json_body(JSON_LD, to_json(payload)?);
        let response = self.send(request).await?;
        if !response.is_success() {
            return Err(status_error(&response, false));
        }
        parse_body(&response)
    }

    /// Merge-patch a project. Returns the server's copy when the response
    /// carries one.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] on 401, otherwise as [`Self::create`].
    pub async fn update(&self, id: i64, patch: &ProjectPatch) -> Result<Option<Project>, ApiError> {
        let request = HttpRequest::new(Method::PATCH, project_endpoint(id)).json_body(MERGE_PATCH, to_json(patch)?);
        let response = self.send(request).await?;
        if !response.is_success() {
            return Err(status_error(&response, false));
        }
        if response.body.trim().is_empty() {
            return Ok(None);
        }
        parse_body(&response).map(Some)
    }

    /// Delete a project. Any 2xx (normally 204) counts as done.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] for a missing token or a non-success status.
    pub async fn remove(&self, id: i64) -> Result<(), ApiError> {
        let response = self.send(HttpRequest::new(Method::DELETE, project_endpoint(id))).await?;
        if !response.is_success() {
            return Err(status_error(&response, false));
        }
        Ok(())
    }
}

// =============================================================================
// AUTH
// =============================================================================

/// Client for the unauthenticated endpoints.
#[derive(Clone)]
pub struct AuthClient {
    transport: Arc<dyn Transport>,
}

impl AuthClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Exchange credentials for a signed token via `POST /api/auth`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::RequestFailed`] with the server's message when the
    /// credentials are refused, [`ApiError::MissingToken`] when a success
    /// response lacks a token, and [`ApiError::Network`] on transport failure.
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<String, ApiError> {
        let request = HttpRequest::new(Method::POST, AUTH_PATH)
            .accept(JSON)
            .json_body(JSON, to_json(credentials)?);
        let response = self.transport.send(request).await?;
        let body = response.json().unwrap_or(Value::Null);

        if !response.is_success() {
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .or_else(|| body.pointer("/error/message").and_then(Value::as_str))
                .map_or_else(|| login_failed_message(response.status), ToOwned::to_owned);
            tracing::info!(status = response.status, "sign-in refused");
            return Err(ApiError::RequestFailed { status: response.status, message });
        }

        body.get("token")
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
            .map(ToOwned::to_owned)
            .ok_or(ApiError::MissingToken)
    }

    /// Create an account via `POST /api/users`; returns the created resource.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ValidationFailed`] with the field violations when
    /// the API rejects the form, [`ApiError::RequestFailed`] for other
    /// failures.
    pub async fn register(&self, registration: &Registration) -> Result<Value, ApiError> {
        let request = HttpRequest::new(Method::POST, USERS_PATH)
            .accept(JSON)
            .json_body(JSON, to_json(registration)?);
        let response = self.transport.send(request).await?;
        let body = response.json().unwrap_or(Value::Null);

        if !response.is_success() {
            if let Some(violations) = violations_in(&body) {
                return Err(ApiError::ValidationFailed(violations));
            }
            let message = body
                .get("message")
                .or_else(|| body.get("detail"))
                .and_then(Value::as_str)
                .map_or_else(|| registration_failed_message(response.status), ToOwned::to_owned);
            return Err(ApiError::RequestFailed { status: response.status, message });
        }
        Ok(body)
    }

    /// Send the public contact form via `POST /api/contact`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] for a non-success status or transport failure.
    pub async fn contact(&self, message: &ContactMessage) -> Result<(), ApiError> {
        let request = HttpRequest::new(Method::POST, CONTACT_PATH)
            .accept(JSON)
            .json_body(JSON, to_json(message)?);
        let response = self.transport.send(request).await?;
        if !response.is_success() {
            tracing::info!(status = response.status, "contact message refused");
            return Err(status_error(&response, false));
        }
        Ok(())
    }

    /// Tell the server the session is over via `POST /logout`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] when the call fails; callers treat this as
    /// best effort.
    pub async fn notify_logout(&self, token: Option<&str>) -> Result<(), ApiError> {
        let mut request = HttpRequest::new(Method::POST, LOGOUT_PATH).accept(JSON);
        if let Some(token) = token {
            request = request.bearer(token);
        }
        let response = self.transport.send(request).await?;
        if !response.is_success() {
            return Err(status_error(&response, false));
        }
        Ok(())
    }
}
