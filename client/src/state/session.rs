//! Signed-in session for the current browser user.
//!
//! SYSTEM CONTEXT
//! ==============
//! The login form hands over a token and role; this module persists them in
//! `localStorage` under `token` and `userRole` and restores them on load.
//! Route guards read `SessionState` from context.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use crate::util::storage;

pub const TOKEN_KEY: &str = "token";
pub const ROLE_KEY: &str = "userRole";

/// Token + role pair returned by a successful login.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub role: String,
}

impl Session {
    /// Build a session from stored values; both must be present and non-blank.
    #[must_use]
    pub fn from_parts(token: Option<String>, role: Option<String>) -> Option<Self> {
        let token = token.filter(|t| !t.trim().is_empty())?;
        let role = role.filter(|r| !r.trim().is_empty())?;
        Some(Self { token, role })
    }

    /// Human label for the role, e.g. `"teacher"` -> `"Teacher"`.
    #[must_use]
    pub fn role_label(&self) -> String {
        let mut chars = self.role.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

/// Session state provided via context.
///
/// `loading` stays `true` until the browser has had a chance to restore the
/// stored session, so guards do not redirect during hydration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionState {
    pub session: Option<Session>,
    pub loading: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self { session: None, loading: true }
    }
}

impl SessionState {
    /// Read the stored session from `localStorage`.
    #[must_use]
    pub fn restore() -> Self {
        Self {
            session: Session::from_parts(storage::get_item(TOKEN_KEY), storage::get_item(ROLE_KEY)),
            loading: false,
        }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }
}

/// Persist a new session and return the state that reflects it.
pub fn store(session: Session) -> SessionState {
    storage::set_item(TOKEN_KEY, &session.token);
    storage::set_item(ROLE_KEY, &session.role);
    SessionState { session: Some(session), loading: false }
}

/// Remove both stored keys.
pub fn clear() -> SessionState {
    storage::remove_item(TOKEN_KEY);
    storage::remove_item(ROLE_KEY);
    SessionState { session: None, loading: false }
}
