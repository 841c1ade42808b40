use std::collections::HashMap;

use super::*;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
    move |key| map.get(key).cloned()
}

const STRONG_SECRET: &str = "0123456789abcdef0123456789abcdef";

#[test]
fn empty_environment_yields_defaults() {
    let settings = Settings::from_lookup(lookup_from(&[])).unwrap();
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.port, 8000);
    assert_eq!(settings.access_token_expire_minutes, 30);
    assert_eq!(settings.allowed_origins, vec!["http://localhost:3000", "https://asili.education.ke"]);
}

#[test]
fn numeric_overrides_are_parsed() {
    let settings = Settings::from_lookup(lookup_from(&[
        ("PORT", "9100"),
        ("DB_MAX_CONNECTIONS", "12"),
        ("ACCESS_TOKEN_EXPIRE_MINUTES", "5"),
        ("LOGIN_RATE_LIMIT", "3"),
        ("LOGIN_RATE_WINDOW_SECS", "30"),
    ]))
    .unwrap();
    assert_eq!(settings.port, 9100);
    assert_eq!(settings.db_max_connections, 12);
    assert_eq!(settings.access_token_expire_minutes, 5);
    assert_eq!(settings.login_rate_limit, 3);
    assert_eq!(settings.login_rate_window_secs, 30);
}

#[test]
fn malformed_port_is_rejected() {
    let err = Settings::from_lookup(lookup_from(&[("PORT", "eighty")])).unwrap_err();
    assert_eq!(err, ConfigError::Invalid { key: "PORT", value: "eighty".to_owned() });
}

#[test]
fn blank_values_fall_back_to_defaults() {
    let settings = Settings::from_lookup(lookup_from(&[("PORT", "   "), ("DATABASE_URL", "")])).unwrap();
    assert_eq!(settings.port, DEFAULT_PORT);
    assert!(settings.database_url.is_none());
}

#[test]
fn production_requires_jwt_secret() {
    let err = Settings::from_lookup(lookup_from(&[("ASILI_ENV", "production")])).unwrap_err();
    assert_eq!(err, ConfigError::MissingJwtSecret);

    let settings =
        Settings::from_lookup(lookup_from(&[("ASILI_ENV", "production"), ("JWT_SECRET", STRONG_SECRET)])).unwrap();
    assert_eq!(settings.environment, Environment::Production);
    assert_eq!(settings.jwt_secret.as_deref(), Some(STRONG_SECRET));
}

#[test]
fn short_jwt_secret_is_rejected_in_any_environment() {
    let err = Settings::from_lookup(lookup_from(&[("JWT_SECRET", "too-short")])).unwrap_err();
    assert_eq!(err, ConfigError::WeakJwtSecret);
}

#[test]
fn unknown_environment_is_rejected() {
    let err = Settings::from_lookup(lookup_from(&[("ASILI_ENV", "staging")])).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { key: "ASILI_ENV", .. }));
}

#[test]
fn allowed_origins_are_split_and_trimmed() {
    let settings = Settings::from_lookup(lookup_from(&[(
        "ALLOWED_ORIGINS",
        " http://a.test/ , ,https://b.test",
    )]))
    .unwrap();
    assert_eq!(settings.allowed_origins, vec!["http://a.test", "https://b.test"]);
}

#[test]
fn wildcard_origin_is_rejected() {
    for raw in ["*", "http://a.test, *", "https://*.asili.ke"] {
        let err = Settings::from_lookup(lookup_from(&[("ALLOWED_ORIGINS", raw)])).unwrap_err();
        assert_eq!(err, ConfigError::Invalid { key: "ALLOWED_ORIGINS", value: raw.to_owned() }, "input {raw:?}");
    }
}

#[test]
fn bootstrap_admin_requires_both_fields() {
    let err = Settings::from_lookup(lookup_from(&[("BOOTSTRAP_ADMIN_EMAIL", "admin@school.ke")])).unwrap_err();
    assert_eq!(err, ConfigError::PartialBootstrapAdmin);

    let settings = Settings::from_lookup(lookup_from(&[
        ("BOOTSTRAP_ADMIN_EMAIL", "admin@school.ke"),
        ("BOOTSTRAP_ADMIN_PASSWORD", "changeme"),
    ]))
    .unwrap();
    assert_eq!(
        settings.bootstrap_admin,
        Some(BootstrapAdmin { email: "admin@school.ke".to_owned(), password: "changeme".to_owned() })
    );
}

const MPESA_CREDENTIALS: [(&str, &str); 4] = [
    ("MPESA_CONSUMER_KEY", "key"),
    ("MPESA_CONSUMER_SECRET", "secret"),
    ("MPESA_SHORTCODE", "174379"),
    ("MPESA_PASSKEY", "passkey"),
];

#[test]
fn mpesa_defaults_to_sandbox_and_public_callback() {
    let mut pairs = MPESA_CREDENTIALS.to_vec();
    pairs.push(("PUBLIC_BASE_URL", "https://api.asili.ke/"));
    let mpesa = Settings::from_lookup(lookup_from(&pairs)).unwrap().mpesa.unwrap();
    assert_eq!(mpesa.base_url, "https://sandbox.safaricom.co.ke");
    assert_eq!(mpesa.callback_url, "https://api.asili.ke/api/v1/fees/mpesa-callback");
    assert_eq!(mpesa.shortcode, "174379");
}

#[test]
fn mpesa_explicit_urls_win() {
    let mut pairs = MPESA_CREDENTIALS.to_vec();
    pairs.extend([
        ("MPESA_BASE_URL", "https://api.safaricom.co.ke/"),
        ("MPESA_CALLBACK_URL", "https://hooks.asili.ke/mpesa"),
        ("PUBLIC_BASE_URL", "https://ignored.test"),
    ]);
    let mpesa = Settings::from_lookup(lookup_from(&pairs)).unwrap().mpesa.unwrap();
    assert_eq!(mpesa.base_url, "https://api.safaricom.co.ke");
    assert_eq!(mpesa.callback_url, "https://hooks.asili.ke/mpesa");
}

#[test]
fn mpesa_credentials_are_all_or_nothing() {
    for missing in 0..MPESA_CREDENTIALS.len() {
        let mut pairs = MPESA_CREDENTIALS.to_vec();
        pairs.remove(missing);
        pairs.push(("PUBLIC_BASE_URL", "https://api.asili.ke"));
        let err = Settings::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert_eq!(err, ConfigError::PartialMpesa);
    }
    assert!(Settings::from_lookup(lookup_from(&[])).unwrap().mpesa.is_none());
}

#[test]
fn mpesa_needs_a_callback_and_numeric_shortcode() {
    let err = Settings::from_lookup(lookup_from(&MPESA_CREDENTIALS)).unwrap_err();
    assert_eq!(err, ConfigError::MissingMpesaCallback);

    let mut pairs = MPESA_CREDENTIALS.to_vec();
    pairs[2] = ("MPESA_SHORTCODE", "17A379");
    pairs.push(("PUBLIC_BASE_URL", "https://api.asili.ke"));
    let err = Settings::from_lookup(lookup_from(&pairs)).unwrap_err();
    assert_eq!(err, ConfigError::Invalid { key: "MPESA_SHORTCODE", value: "17A379".to_owned() });
}
