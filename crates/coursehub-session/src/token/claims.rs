//! Claims read from a token payload.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

/// The subset of payload claims the client cares about.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenClaims {
    /// Expiry instant (`exp`, seconds since epoch, fractional allowed).
    pub expires_at: DateTime<Utc>,
    /// Issue instant (`iat`), when present.
    pub issued_at: Option<DateTime<Utc>>,
    /// Subject: `sub`, falling back to `id` or `userId`.
    pub subject: Option<String>,
    /// Role claim, when present.
    pub role: Option<String>,
}

impl TokenClaims {
    /// Extract claims from a decoded payload. Returns `None` when `exp`
    /// is absent or not a number.
    pub(crate) fn from_payload(payload: &Map<String, Value>) -> Option<Self> {
        let expires_at = payload.get("exp").and_then(epoch_seconds)?;
        let issued_at = payload.get("iat").and_then(epoch_seconds);
        let subject = ["sub", "id", "userId"]
            .iter()
            .find_map(|k| payload.get(*k).and_then(scalar_string));
        let role = payload.get("role").and_then(scalar_string);

        Some(Self {
            expires_at,
            issued_at,
            subject,
            role,
        })
    }

    /// Valid only while `now` is strictly before the expiry.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    /// Time left before expiry; zero once expired.
    pub fn remaining(&self, now: DateTime<Utc>) -> chrono::Duration {
        (self.expires_at - now).max(chrono::Duration::zero())
    }
}

fn epoch_seconds(value: &Value) -> Option<DateTime<Utc>> {
    let seconds = value.as_f64()?;
    if !seconds.is_finite() {
        return None;
    }
    // Values past the representable range pin to its ends.
    let millis = (seconds * 1000.0).floor();
    if millis >= DateTime::<Utc>::MAX_UTC.timestamp_millis() as f64 {
        return Some(DateTime::<Utc>::MAX_UTC);
    }
    if millis <= DateTime::<Utc>::MIN_UTC.timestamp_millis() as f64 {
        return Some(DateTime::<Utc>::MIN_UTC);
    }
    DateTime::from_timestamp_millis(millis as i64)
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn payload(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_reads_numeric_subject_and_fractional_exp() {
        let claims = TokenClaims::from_payload(&payload(json!({
            "exp": 1700000000.5,
            "id": 77,
            "role": "student"
        })))
        .unwrap();
        assert_eq!(claims.expires_at.timestamp_millis(), 1_700_000_000_500);
        assert_eq!(claims.subject.as_deref(), Some("77"));
        assert_eq!(claims.role.as_deref(), Some("student"));
    }

    #[test]
    fn test_out_of_range_exp_is_clamped() {
        let far = TokenClaims::from_payload(&payload(json!({"exp": 1e300}))).unwrap();
        assert_eq!(far.expires_at, DateTime::<Utc>::MAX_UTC);
        assert!(far.is_valid_at(Utc::now()));

        let ancient = TokenClaims::from_payload(&payload(json!({"exp": -1e300}))).unwrap();
        assert_eq!(ancient.expires_at, DateTime::<Utc>::MIN_UTC);
        assert!(!ancient.is_valid_at(Utc::now()));
    }

    #[test]
    fn test_exp_must_be_numeric() {
        assert!(TokenClaims::from_payload(&payload(json!({"exp": "tomorrow"}))).is_none());
        assert!(TokenClaims::from_payload(&payload(json!({"sub": "u1"}))).is_none());
    }
}
