//! Auth-session state for the current user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Used by route guards and user-aware views to coordinate login redirects and
//! identity-dependent rendering. The session is an explicit object handed to
//! whatever needs it; there is no ambient global.
//!
//! LIFECYCLE
//! =========
//! `RESTORING -> AUTHENTICATED | ANONYMOUS` via [`Session::initialize`], then
//! `AUTHENTICATED -> ANONYMOUS` on logout, invalidation or detected expiry.
//! Logout never waits on the network: the server is told afterwards, if at all.
//! Only `login`, `logout` and `invalidate` write the token store.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::net::api::AuthClient;
use crate::util::clock::Clock;
use crate::util::token::{self, Claims};
use crate::util::token_store::{TokenStore, TokenStoreError};

pub const ROLE_ADMIN: &str = "ROLE_ADMIN";

/// The signed-in user, derived from token claims and never persisted on its
/// own.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub email: String,
    pub roles: BTreeSet<String>,
    pub display_name: Option<String>,
}

impl User {
    fn from_claims(claims: Claims) -> Self {
        Self {
            email: claims.subject.unwrap_or_default(),
            roles: claims.roles,
            display_name: claims.display_name,
        }
    }

    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.has_role(ROLE_ADMIN)
    }
}

/// What the login form knows about the user it just signed in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoginUser {
    pub email: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    Restoring,
    Authenticated,
    Anonymous,
}

/// Authentication state tracking the current user and loading status.
///
/// `authenticated` implies `user.is_some()`; the constructors are the only way
/// the session builds one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthState {
    pub authenticated: bool,
    pub user: Option<User>,
    pub loading: bool,
}

impl Default for AuthState {
    /// A fresh state is still restoring from storage.
    fn default() -> Self {
        Self::restoring()
    }
}

impl AuthState {
    #[must_use]
    pub fn restoring() -> Self {
        Self { authenticated: false, user: None, loading: true }
    }

    #[must_use]
    pub fn anonymous() -> Self {
        Self { authenticated: false, user: None, loading: false }
    }

    #[must_use]
    pub fn signed_in(user: User) -> Self {
        Self { authenticated: true, user: Some(user), loading: false }
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        if self.loading {
            SessionPhase::Restoring
        } else if self.authenticated {
            SessionPhase::Authenticated
        } else {
            SessionPhase::Anonymous
        }
    }

    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.authenticated && self.user.as_ref().is_some_and(|u| u.has_role(role))
    }
}

/// Owner of the session lifecycle.
pub struct Session {
    store: Arc<dyn TokenStore>,
    clock: Arc<dyn Clock>,
    state: AuthState,
    resolved: bool,
}

impl Session {
    pub fn new(store: Arc<dyn TokenStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock, state: AuthState::restoring(), resolved: false }
    }

    #[must_use]
    pub fn state(&self) -> &AuthState {
        &self.state
    }

    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.state.user.as_ref()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state.authenticated
    }

    /// Raw token currently held by the store.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.store.read()
    }

    /// Claims of the stored token, if it still decodes.
    #[must_use]
    pub fn claims(&self) -> Option<Claims> {
        self.store.read().and_then(|t| token::decode(&t).ok())
    }

    /// Restore the session from the token store.
    ///
    /// Resolves once; later calls return the current state untouched. A
    /// stored token that does not decode or has expired is cleared.
    pub fn initialize(&mut self) -> &AuthState {
        if self.resolved {
            return &self.state;
        }
        self.resolved = true;

        let Some(raw) = self.store.read() else {
            tracing::debug!("no stored token; anonymous");
            self.state = AuthState::anonymous();
            return &self.state;
        };

        match token::validate(&raw, self.clock.now_ms()) {
            Ok(claims) => {
                let user = User::from_claims(claims);
                tracing::info!(email = %user.email, "session restored");
                self.state = AuthState::signed_in(user);
            }
            Err(e) => {
                tracing::info!(error = %e, "stored token rejected; signing out");
                self.forget_token();
                self.state = AuthState::anonymous();
            }
        }
        &self.state
    }

    /// Adopt a freshly issued token.
    ///
    /// The caller's email wins over the token subject; roles and display name
    /// come from the token. A token that does not decode (or is already
    /// expired) is never trusted, even after a successful sign-in call: the
    /// store is cleared and the session ends anonymous.
    ///
    /// # Errors
    ///
    /// Returns an error if the token cannot be persisted; the session is then
    /// anonymous.
    pub fn login(&mut self, user_data: LoginUser, raw_token: &str) -> Result<&AuthState, TokenStoreError> {
        self.resolved = true;
        if let Err(e) = self.store.save(raw_token) {
            tracing::warn!(error = %e, "could not store issued token; staying anonymous");
            self.state = AuthState::anonymous();
            return Err(e);
        }

        match token::validate(raw_token, self.clock.now_ms()) {
            Ok(claims) => {
                let mut user = User::from_claims(claims);
                if !user_data.email.trim().is_empty() {
                    user.email = user_data.email;
                }
                tracing::info!(email = %user.email, admin = user.is_admin(), "signed in");
                self.state = AuthState::signed_in(user);
            }
            Err(e) => {
                tracing::warn!(error = %e, "issued token rejected; staying anonymous");
                self.forget_token();
                self.state = AuthState::anonymous();
            }
        }
        Ok(&self.state)
    }

    /// Sign out locally. Returns the token that was stored so the caller can
    /// pass it to [`announce_logout`].
    ///
    /// The transition is complete when this returns; telling the server is a
    /// separate step whose outcome never reverses it.
    pub fn logout(&mut self) -> Option<String> {
        let token = self.store.read();
        self.resolved = true;
        self.forget_token();
        self.state = AuthState::anonymous();
        tracing::info!("signed out");
        token
    }

    /// Stop trusting the stored token, e.g. after the API answered 401.
    pub fn invalidate(&mut self) {
        if self.state.authenticated {
            tracing::info!("session invalidated");
        }
        self.resolved = true;
        self.forget_token();
        self.state = AuthState::anonymous();
    }

    /// Invalidate an authenticated session whose token has expired or gone
    /// missing. Returns whether the session was ended.
    pub fn check_expiry(&mut self) -> bool {
        if !self.state.authenticated {
            return false;
        }
        let still_valid = self
            .store
            .read()
            .is_some_and(|raw| token::validate(&raw, self.clock.now_ms()).is_ok());
        if still_valid {
            return false;
        }
        tracing::info!("token expired during session");
        self.invalidate();
        true
    }

    fn forget_token(&self) {
        if let Err(e) = self.store.clear() {
            tracing::warn!(error = %e, "failed to clear stored token");
        }
    }
}

/// Best-effort sign-out notification for a token already dropped by
/// [`Session::logout`]. Failures are logged and otherwise ignored.
pub async fn announce_logout(auth: &AuthClient, token: Option<String>) {
    if let Err(e) = auth.notify_logout(token.as_deref()).await {
        tracing::warn!(error = %e, "logout notification failed; local sign-out stands");
    }
}
