//! Registration form errors.
//!
//! Violations from `POST /api/users` land next to the input they concern.
//! The API names the password `plainPassword`; the form calls it `password`.

#[cfg(test)]
#[path = "register_test.rs"]
mod register_test;

use crate::net::api::AuthClient;
use crate::net::error::ApiError;
use crate::net::types::{Registration, Violation};

/// Per-field messages for the registration form. Empty means no error.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldErrors {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    /// Messages not tied to a known field, space-joined.
    pub general: String,
}

impl FieldErrors {
    /// Sort violations into their fields. A later violation for the same
    /// field replaces an earlier one.
    #[must_use]
    pub fn from_violations(violations: &[Violation]) -> Self {
        let mut errors = Self::default();
        for violation in violations {
            let message = violation.message.clone();
            match violation.property_path.as_str() {
                "firstName" => errors.first_name = message,
                "lastName" => errors.last_name = message,
                "email" => errors.email = message,
                "plainPassword" => errors.password = message,
                _ => errors.push_general(&message),
            }
        }
        errors
    }

    #[must_use]
    pub fn from_error(err: &ApiError) -> Self {
        match err {
            ApiError::ValidationFailed(violations) => Self::from_violations(violations),
            other => Self { general: other.to_string(), ..Self::default() },
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// `(field, message)` pairs that carry a message, in form order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("firstName", self.first_name.as_str()),
            ("lastName", self.last_name.as_str()),
            ("email", self.email.as_str()),
            ("password", self.password.as_str()),
            ("general", self.general.as_str()),
        ]
        .into_iter()
        .filter(|(_, message)| !message.is_empty())
    }

    fn push_general(&mut self, message: &str) {
        if !self.general.is_empty() {
            self.general.push(' ');
        }
        self.general.push_str(message);
    }
}

/// Submit the registration form.
///
/// # Errors
///
/// Returns the [`FieldErrors`] to show when the API refuses the account or
/// cannot be reached.
pub async fn submit(auth: &AuthClient, registration: &Registration) -> Result<(), FieldErrors> {
    match auth.register(registration).await {
        Ok(_) => {
            tracing::info!(email = %registration.email, "account registered");
            Ok(())
        }
        Err(e) => {
            tracing::info!(error = %e, "registration refused");
            Err(FieldErrors::from_error(&e))
        }
    }
}
