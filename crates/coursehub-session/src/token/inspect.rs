//! Structural and temporal token checks.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde_json::Value;

use super::claims::TokenClaims;
use super::error::TokenRejection;

/// Decode the payload claims without judging expiry.
///
/// Fails when the token is not three dot-separated segments, when the
/// middle segment is not base64url JSON, or when it carries no `exp`.
pub fn decode_claims(token: &str) -> Result<TokenClaims, TokenRejection> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(TokenRejection::SegmentCount(segments.len()));
    }

    // Accept padded and standard-alphabet payloads as well.
    let normalized: String = segments[1]
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();

    let bytes = URL_SAFE_NO_PAD
        .decode(normalized.as_bytes())
        .map_err(|e| TokenRejection::PayloadEncoding(e.to_string()))?;

    let payload = match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            return Err(TokenRejection::PayloadFormat(format!(
                "expected an object, found {}",
                json_type(&other)
            )));
        }
        Err(e) => return Err(TokenRejection::PayloadFormat(e.to_string())),
    };

    TokenClaims::from_payload(&payload).ok_or(TokenRejection::MissingExpiry)
}

/// Decide whether `token` is usable at `now`.
///
/// A token whose expiry equals `now` is already expired.
pub fn inspect_token(token: &str, now: DateTime<Utc>) -> Result<TokenClaims, TokenRejection> {
    let claims = decode_claims(token)?;
    if claims.is_valid_at(now) {
        Ok(claims)
    } else {
        Err(TokenRejection::Expired {
            expired_at: claims.expires_at,
        })
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
