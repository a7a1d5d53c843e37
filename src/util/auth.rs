//! Shared route-guard helpers.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every page applies the same redirect rules, so the decision lives here and
//! pages only declare what they require. The guard is a presentation concern:
//! the API still authorizes each request.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use crate::state::auth::AuthState;

pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/";

/// Access a page needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Requirement {
    /// Open to everyone.
    None,
    Authenticated,
    /// Authenticated with this role.
    Role(&'static str),
    /// Only for signed-out visitors (login, register).
    Guest,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    /// The session is still restoring; render a neutral waiting state.
    Pending,
    Allow,
    Redirect(&'static str),
}

/// Decide what to do with a visit to a page requiring `requirement`.
///
/// A missing role redirects to the login page rather than showing a
/// forbidden page.
#[must_use]
pub fn evaluate(state: &AuthState, requirement: &Requirement) -> GuardDecision {
    if state.loading {
        return GuardDecision::Pending;
    }
    match requirement {
        Requirement::None => GuardDecision::Allow,
        Requirement::Authenticated if !state.authenticated => GuardDecision::Redirect(LOGIN_PATH),
        Requirement::Role(role) if !state.has_role(role) => GuardDecision::Redirect(LOGIN_PATH),
        Requirement::Guest if state.authenticated => GuardDecision::Redirect(HOME_PATH),
        _ => GuardDecision::Allow,
    }
}
