//! Bearer-token decoding and expiry checks.
//!
//! TRUST BOUNDARY
//! ==============
//! Only the payload segment is parsed. The signature segment is never checked,
//! so nothing here may be used to grant access: the issuing API verifies the
//! token on every request and these claims only drive what the client shows.
//!
//! TIME
//! ====
//! `exp`/`iat` are epoch seconds; the wall clock is compared in milliseconds,
//! so expiry is `exp * 1000 <= now_ms`.

#[cfg(test)]
#[path = "token_test.rs"]
mod token_test;

use std::collections::BTreeSet;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

/// Structural failures while turning a token string into [`Claims`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("token must have 3 segments, found {0}")]
    SegmentCount(usize),

    #[error("token segment {0} is empty")]
    EmptySegment(usize),

    #[error("token payload is not base64url: {0}")]
    Base64(String),

    #[error("token payload is not a claims object: {0}")]
    Payload(String),
}

/// Reasons a stored or freshly issued token is treated as absent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("token has no expiry claim")]
    MissingExpiry,

    #[error("token expired at {expires_at}")]
    Expired { expires_at: i64 },
}

/// Decoded payload of a bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Account identifier, normally the e-mail the user signed in with.
    pub subject: Option<String>,
    pub roles: BTreeSet<String>,
    pub display_name: Option<String>,
    /// Issued-at, epoch seconds.
    pub issued_at: Option<i64>,
    /// Expiry, epoch seconds.
    pub expires_at: Option<i64>,
}

impl Claims {
    /// Whether the token must be treated as absent at `now_ms`.
    ///
    /// A token without `exp` never counts as valid.
    #[must_use]
    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        self.expires_at
            .map_or(true, |exp| exp.saturating_mul(1000) <= now_ms)
    }

    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }
}

// Issuers disagree on claim names (`username` vs `sub`, `firstName` vs
// `name`), so every spelling is read and the first present one wins.
#[derive(Deserialize)]
struct RawClaims {
    username: Option<String>,
    sub: Option<String>,
    email: Option<String>,
    #[serde(default)]
    roles: Vec<String>,
    #[serde(rename = "displayName")]
    display_name: Option<String>,
    #[serde(rename = "firstName")]
    first_name: Option<String>,
    name: Option<String>,
    #[serde(default, deserialize_with = "numeric_date")]
    iat: Option<i64>,
    #[serde(default, deserialize_with = "numeric_date")]
    exp: Option<i64>,
}

// NumericDate may carry a fractional part; whole seconds are enough here.
fn numeric_date<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(seconds) = Option::<f64>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if !seconds.is_finite() {
        return Err(D::Error::custom("NumericDate is not a finite number"));
    }
    #[allow(clippy::cast_possible_truncation)]
    let whole = seconds.floor() as i64;
    Ok(Some(whole))
}

impl From<RawClaims> for Claims {
    fn from(raw: RawClaims) -> Self {
        Self {
            subject: raw.username.or(raw.email).or(raw.sub),
            roles: raw.roles.into_iter().collect(),
            display_name: raw.display_name.or(raw.first_name).or(raw.name),
            issued_at: raw.iat,
            expires_at: raw.exp,
        }
    }
}

/// Parse the payload of `token` without verifying its signature.
///
/// # Errors
///
/// Returns a [`DecodeError`] if the token is not three non-empty
/// dot-separated segments, the payload is not base64url, or the payload is
/// not a JSON claims object.
pub fn decode(token: &str) -> Result<Claims, DecodeError> {
    let segments: Vec<&str> = token.trim().split('.').collect();
    if segments.len() != 3 {
        return Err(DecodeError::SegmentCount(segments.len()));
    }
    if let Some(index) = segments.iter().position(|s| s.is_empty()) {
        return Err(DecodeError::EmptySegment(index));
    }

    let payload = segments[1].trim_end_matches('=');
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| DecodeError::Base64(e.to_string()))?;
    let raw: RawClaims =
        serde_json::from_slice(&bytes).map_err(|e| DecodeError::Payload(e.to_string()))?;
    Ok(raw.into())
}

/// Decode `token` and reject it unless it carries an expiry still in the
/// future at `now_ms`.
///
/// # Errors
///
/// Returns [`TokenError::Decode`] for malformed tokens,
/// [`TokenError::MissingExpiry`] when `exp` is absent and
/// [`TokenError::Expired`] when it has passed.
pub fn validate(token: &str, now_ms: i64) -> Result<Claims, TokenError> {
    let claims = decode(token)?;
    match claims.expires_at {
        None => Err(TokenError::MissingExpiry),
        Some(expires_at) if claims.is_expired_at(now_ms) => Err(TokenError::Expired { expires_at }),
        Some(_) => Ok(claims),
    }
}
