//! The token/user pair held for an authenticated visit.

use serde::Serialize;

use crate::user::UserIdentity;

/// Current client session.
///
/// A user is only ever held together with a token. The reverse is allowed:
/// a token may be present while the user record is still loading.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Session {
    token: Option<String>,
    user: Option<UserIdentity>,
}

impl Session {
    /// A session with nothing in it.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A session for the given token and, optionally, its user.
    pub fn new(token: impl Into<String>, user: Option<UserIdentity>) -> Self {
        Self {
            token: Some(token.into()),
            user,
        }
    }

    /// The bearer token, if any.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// The signed-in user, if loaded.
    pub fn user(&self) -> Option<&UserIdentity> {
        self.user.as_ref()
    }

    /// Whether a token is held.
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Whether both fields are absent.
    pub fn is_empty(&self) -> bool {
        self.token.is_none() && self.user.is_none()
    }

    /// Replace the user while keeping the token. Returns `false` (and
    /// changes nothing) when no token is held.
    pub fn with_user(&mut self, user: UserIdentity) -> bool {
        if self.token.is_none() {
            return false;
        }
        self.user = Some(user);
        true
    }
}

/// Short, log-safe identifier for a token: its last six characters.
pub fn token_fingerprint(token: &str) -> String {
    let tail: String = token
        .chars()
        .rev()
        .take(6)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("…{tail}")
}
