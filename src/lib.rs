//! # folio
//!
//! Client core for the portfolio admin application: bearer-token session
//! lifecycle, role-gated page access, and the project resource client with the
//! view models that apply confirmed writes to locally cached state.
//!
//! SYSTEM CONTEXT
//! ==============
//! `util` holds the token store, token decoder and route guard. `state` holds
//! the session and per-view models. `net` talks to the remote API. `pages`
//! names the screens the guard protects.
//!
//! TRUST BOUNDARY
//! ==============
//! Tokens are decoded, never verified. Everything derived from a decoded
//! token (roles included) only shapes what the client shows; the API enforces
//! authorization on every request.

pub mod config;
pub mod net;
pub mod pages;
pub mod state;
pub mod util;

#[cfg(test)]
mod test_support;
