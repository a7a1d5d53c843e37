//! Utility helpers shared across the session and view layers.
//!
//! SYSTEM CONTEXT
//! ==============
//! Token handling and route guarding are kept free of network code so they
//! can be reasoned about (and tested) as plain functions.

pub mod auth;
pub mod clock;
pub mod token;
pub mod token_store;
