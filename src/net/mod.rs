//! Networking for the portfolio REST API.
//!
//! SYSTEM CONTEXT
//! ==============
//! `transport` is the HTTP seam, `api` holds the resource and auth clients,
//! `types` defines the wire schema and `error` the failure taxonomy.

pub mod api;
pub mod error;
pub mod transport;
pub mod types;
