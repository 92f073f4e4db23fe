//! Session token checks
//!
//! The service verifies signatures. Locally the token is only decoded to
//! refuse requests whose `exp` claim has already passed.

use crate::error::AiError;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Claims {
    /// Expiration (Unix timestamp)
    exp: Option<i64>,
}

/// Expiry of a JWT, if it carries one
pub fn expiry(token: &str) -> Result<Option<i64>, AiError> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(AiError::Unauthorized("Malformed session token".to_string()));
    }

    let payload = URL_SAFE_NO_PAD
        .decode(parts[1])
        .map_err(|e| AiError::Unauthorized(format!("Invalid token encoding: {}", e)))?;
    let claims: Claims = serde_json::from_slice(&payload)
        .map_err(|e| AiError::Unauthorized(format!("Invalid token claims: {}", e)))?;
    Ok(claims.exp)
}

/// Fail with [`AiError::Unauthorized`] when the token expired at or before `now`
pub fn ensure_fresh(token: &str, now: i64) -> Result<(), AiError> {
    match expiry(token)? {
        Some(exp) if exp <= now => Err(AiError::Unauthorized("Session token expired".to_string())),
        _ => Ok(()),
    }
}

#[cfg(test)]
pub(crate) fn test_token(exp: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"user-1","exp":{}}}"#, exp));
    format!("{}.{}.signature", header, payload)
}
