use super::*;

#[test]
fn hash_then_verify_accepts_original_password() {
    let hash = hash_password("kilimanjaro-42").unwrap();
    assert!(hash.starts_with("$argon2id$"));
    assert!(verify_password(&hash, "kilimanjaro-42").unwrap());
}

#[test]
fn verify_rejects_wrong_password() {
    let hash = hash_password("kilimanjaro-42").unwrap();
    assert!(!verify_password(&hash, "kilimanjaro-43").unwrap());
}

#[test]
fn same_password_hashes_differ_by_salt() {
    let a = hash_password("same").unwrap();
    let b = hash_password("same").unwrap();
    assert_ne!(a, b);
}

#[test]
fn malformed_stored_hash_is_an_error() {
    assert!(matches!(
        verify_password("not-a-phc-string", "whatever"),
        Err(PasswordError::StoredHashInvalid(_))
    ));
}

#[test]
fn dummy_hash_parses_and_matches_nothing() {
    assert!(!verify_password(DUMMY_HASH, "").unwrap());
    assert!(!verify_password(DUMMY_HASH, "Harambee-2030").unwrap());
}

#[test]
fn dummy_hash_uses_default_cost_parameters() {
    let real = hash_password("pw").unwrap();
    let params = |phc: &str| phc.split('$').nth(3).map(str::to_owned);
    assert_eq!(params(DUMMY_HASH), params(&real));
}
