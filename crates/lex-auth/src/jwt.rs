use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, TimeDelta, Utc};

use crate::error::AuthError;

/// Read the `exp` claim of a JWT without verifying its signature.
///
/// Only for display and early-expiry hints; the server stays the authority
/// on whether a token is accepted.
///
/// # Errors
///
/// Returns `AuthError::MalformedResponse` if the token is not a three-part
/// JWT, the payload is not base64url JSON, or `exp` is missing.
pub fn decode_expiry(jwt: &str) -> Result<DateTime<Utc>, AuthError> {
    let parts: Vec<&str> = jwt.split('.').collect();
    let [_, payload, _] = parts.as_slice() else {
        return Err(AuthError::MalformedResponse("invalid JWT format".into()));
    };
    let payload = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| AuthError::MalformedResponse(format!("JWT payload is not base64url: {e}")))?;
    let claims: serde_json::Value = serde_json::from_slice(&payload)
        .map_err(|e| AuthError::MalformedResponse(format!("JWT payload is not JSON: {e}")))?;
    let exp = claims["exp"]
        .as_i64()
        .ok_or_else(|| AuthError::MalformedResponse("missing exp claim".into()))?;
    DateTime::from_timestamp(exp, 0)
        .ok_or_else(|| AuthError::MalformedResponse("invalid exp timestamp".into()))
}

/// Whether `jwt` expires within `leeway` of now. Undecodable tokens count as
/// not expired, so the server gets to decide.
#[must_use]
pub fn expires_within(jwt: &str, leeway: TimeDelta) -> bool {
    decode_expiry(jwt).is_ok_and(|exp| exp <= Utc::now() + leeway)
}
