//! Client-side state: the session and the per-view models.
//!
//! View models never mutate before the server confirms a write; every failure
//! is kept as a [`errors::ViewError`] for the view to render.

pub mod auth;
pub mod errors;
pub mod project;
pub mod projects;
pub mod register;
