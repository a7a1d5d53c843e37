//! Renderable outcomes of failed API calls.

#[cfg(test)]
#[path = "errors_test.rs"]
mod errors_test;

use crate::net::error::ApiError;
use crate::net::types::Violation;

/// What a view shows when a call fails.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ViewError {
    /// The session is gone or was rejected; send the user to sign in.
    #[error("please sign in again")]
    Reauthenticate,

    #[error("not found")]
    NotFound,

    /// Field-level rejections, shown next to their inputs.
    #[error("{}", join_messages(.0))]
    Validation(Vec<Violation>),

    /// Anything else, shown as a single message.
    #[error("{0}")]
    Banner(String),
}

impl ViewError {
    #[must_use]
    pub fn from_api(err: &ApiError) -> Self {
        match err {
            ApiError::AuthenticationRequired | ApiError::Unauthorized => Self::Reauthenticate,
            ApiError::NotFound => Self::NotFound,
            ApiError::ValidationFailed(violations) => Self::Validation(violations.clone()),
            other => Self::Banner(other.to_string()),
        }
    }

    #[must_use]
    pub fn requires_sign_in(&self) -> bool {
        matches!(self, Self::Reauthenticate)
    }
}

fn join_messages(violations: &[Violation]) -> String {
    violations.iter().map(|v| v.message.as_str()).collect::<Vec<_>>().join(" ")
}
