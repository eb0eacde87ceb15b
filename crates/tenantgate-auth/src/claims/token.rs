//! Compact three-segment token payload decoding.
//!
//! The signature is not verified here: the payload is only read to derive
//! the expiry instant and, when present, the user's claims. The server
//! remains the authority on token validity.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde_json::Value;

use tenantgate_core::types::UserClaims;

use super::normalizer::normalize_claims;

/// Decode the middle segment of a `header.payload.signature` token.
///
/// Returns `None` for anything malformed: wrong segment count, invalid
/// base64url, invalid JSON, or a payload that is not an object.
pub fn decode_token_payload(token: &str) -> Option<Value> {
    let mut segments = token.trim().split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return None;
    };

    if payload.is_empty() {
        return None;
    }

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .ok()?;

    match serde_json::from_slice::<Value>(&bytes).ok()? {
        value @ Value::Object(_) => Some(value),
        _ => None,
    }
}

/// Read the `exp` claim (seconds since epoch) of a token.
pub fn token_expiry(token: &str) -> Option<DateTime<Utc>> {
    let payload = decode_token_payload(token)?;
    let exp = payload.get("exp")?;
    let seconds = exp.as_i64().or_else(|| exp.as_f64().map(|f| f as i64))?;
    DateTime::from_timestamp(seconds, 0)
}

/// Decode a token and normalize its payload into claims.
pub fn claims_from_token(token: &str) -> Option<UserClaims> {
    decode_token_payload(token).and_then(|payload| normalize_claims(&payload))
}
