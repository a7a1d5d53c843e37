//! Client configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::path::PathBuf;

use crate::net::transport::{ReqwestTransport, TransportError};
use crate::util::token_store::FileTokenStore;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const BASE_URL_VAR: &str = "FOLIO_API_BASE_URL";
pub const TOKEN_PATH_VAR: &str = "FOLIO_TOKEN_PATH";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("API base URL must start with http:// or https://, got {0:?}")]
    InvalidBaseUrl(String),

    #[error("no data or home directory to keep the token in; set FOLIO_TOKEN_PATH")]
    NoTokenDir,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API origin without a trailing slash.
    pub base_url: String,
    /// File holding the bearer token between runs.
    pub token_path: PathBuf,
}

impl ClientConfig {
    /// Build a config from explicit values, normalizing the base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] unless `base_url` is http(s).
    pub fn new(base_url: &str, token_path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        Ok(Self { base_url: normalize_base_url(base_url)?, token_path: token_path.into() })
    }

    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `FOLIO_API_BASE_URL`: default `http://localhost:8000`
    /// - `FOLIO_TOKEN_PATH`: default `<data dir>/folio/token`
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for a non-http(s) base URL or when no token
    /// location can be derived.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// As [`Self::from_env`], reading variables through `lookup`.
    ///
    /// # Errors
    ///
    /// As [`Self::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = lookup(BASE_URL_VAR)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
        let token_path = match lookup(TOKEN_PATH_VAR).filter(|v| !v.trim().is_empty()) {
            Some(path) => PathBuf::from(path),
            None => default_token_path().ok_or(ConfigError::NoTokenDir)?,
        };
        Self::new(&base_url, token_path)
    }

    #[must_use]
    pub fn token_store(&self) -> FileTokenStore {
        FileTokenStore::new(&self.token_path)
    }

    /// # Errors
    ///
    /// Returns a [`TransportError`] if the HTTP client cannot be built.
    pub fn transport(&self) -> Result<ReqwestTransport, TransportError> {
        ReqwestTransport::new(&self.base_url)
    }
}

fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed.to_owned())
    } else {
        Err(ConfigError::InvalidBaseUrl(raw.to_owned()))
    }
}

/// `<data dir>/folio/token`, or `~/.folio/token` where the platform has no
/// data directory.
#[must_use]
pub fn default_token_path() -> Option<PathBuf> {
    dirs::data_dir()
        .map(|dir| dir.join("folio").join("token"))
        .or_else(|| dirs::home_dir().map(|home| home.join(".folio").join("token")))
}
