//! Unverified credential decoding.
//!
//! The client only reads the embedded expiry as a UX optimization; it never
//! checks the signature. A forged or revoked token is caught by the
//! backend's 401 on the first authenticated call.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    #[error("credential is not a three-segment token")]
    Malformed,

    #[error("credential payload is not valid base64url")]
    InvalidEncoding,

    #[error("credential claims are not valid JSON: {0}")]
    InvalidClaims(String),
}

/// Claims the backend embeds at login.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Claims {
    /// Username the token was issued for.
    pub sub: String,
    #[serde(default)]
    pub role: Option<String>,
    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
    #[serde(default)]
    pub iat: Option<i64>,
}

impl Claims {
    /// `exp <= now` counts as expired.
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.exp <= now
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now().timestamp())
    }
}

/// Decode the payload segment of a bearer token without verifying its
/// signature.
pub fn decode_unverified(token: &str) -> Result<Claims, DecodeError> {
    let mut segments = token.split('.');
    let payload = match (segments.next(), segments.next(), segments.next(), segments.next()) {
        (Some(_header), Some(payload), Some(_signature), None) => payload,
        _ => return Err(DecodeError::Malformed),
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| DecodeError::InvalidEncoding)?;

    serde_json::from_slice(&bytes).map_err(|e| DecodeError::InvalidClaims(e.to_string()))
}
