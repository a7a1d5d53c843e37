//! Error taxonomy for calls against the portfolio API.

use super::transport::TransportError;
use super::types::Violation;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// No token was stored; the request was never sent.
    #[error("authentication required")]
    AuthenticationRequired,

    /// The API rejected the token (HTTP 401).
    #[error("unauthorized: sign in again")]
    Unauthorized,

    /// The requested item does not exist (HTTP 404 on a read).
    #[error("not found")]
    NotFound,

    /// The API rejected the payload field by field.
    #[error("validation failed: {}", summarize(.0))]
    ValidationFailed(Vec<Violation>),

    /// Any other non-success status.
    #[error("{message}")]
    RequestFailed { status: u16, message: String },

    /// Login succeeded but the response carried no token.
    #[error("no token received after sign-in")]
    MissingToken,

    /// No HTTP response at all.
    #[error("network error: {0}")]
    Network(String),

    /// A success response whose body could not be read.
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// Whether the stored token must stop being trusted.
    #[must_use]
    pub fn invalidates_session(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        Self::Network(err.message)
    }
}

fn summarize(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| {
            if v.property_path.is_empty() {
                v.message.clone()
            } else {
                format!("{}: {}", v.property_path, v.message)
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

pub(crate) fn generic_failure_message(status: u16) -> String {
    format!("request failed with status {status}")
}
