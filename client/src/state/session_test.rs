use super::*;

#[test]
fn storage_keys_match_existing_clients() {
    assert_eq!(TOKEN_KEY, "token");
    assert_eq!(ROLE_KEY, "userRole");
}

#[test]
fn default_state_is_loading_without_session() {
    let state = SessionState::default();
    assert!(state.loading);
    assert!(!state.is_authenticated());
}

#[test]
fn from_parts_requires_both_values() {
    assert_eq!(
        Session::from_parts(Some("t".into()), Some("admin".into())),
        Some(Session { token: "t".into(), role: "admin".into() })
    );
    assert_eq!(Session::from_parts(None, Some("admin".into())), None);
    assert_eq!(Session::from_parts(Some("t".into()), None), None);
    assert_eq!(Session::from_parts(Some("  ".into()), Some("admin".into())), None);
}

#[test]
fn role_label_capitalizes_first_letter() {
    let session = Session { token: "t".into(), role: "teacher".into() };
    assert_eq!(session.role_label(), "Teacher");
    let empty = Session { token: "t".into(), role: String::new() };
    assert_eq!(empty.role_label(), "");
}

#[test]
fn store_and_clear_produce_loaded_states() {
    let stored = store(Session { token: "abc".into(), role: "parent".into() });
    assert!(!stored.loading);
    assert!(stored.is_authenticated());

    let cleared = clear();
    assert!(!cleared.loading);
    assert!(!cleared.is_authenticated());
}

#[test]
fn restore_outside_browser_is_signed_out() {
    let state = SessionState::restore();
    assert!(!state.loading);
    assert!(state.session.is_none());
}
