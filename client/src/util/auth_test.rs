use super::*;
use crate::state::session::Session;

#[test]
fn should_redirect_unauth_when_not_loading_and_session_missing() {
    let state = SessionState { session: None, loading: false };
    assert!(should_redirect_unauth(&state));
}

#[test]
fn should_not_redirect_while_loading() {
    let state = SessionState { session: None, loading: true };
    assert!(!should_redirect_unauth(&state));
}

#[test]
fn should_not_redirect_when_session_exists() {
    let state = SessionState {
        session: Some(Session { token: "tok".to_owned(), role: "admin".to_owned() }),
        loading: false,
    };
    assert!(!should_redirect_unauth(&state));
}
