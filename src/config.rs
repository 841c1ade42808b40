//! Runtime configuration parsed from environment variables.
//!
//! SYSTEM CONTEXT
//! ==============
//! `main` loads `.env` (if present) via `dotenvy` and then builds a typed
//! [`Settings`] once. Everything downstream receives the parsed values through
//! `AppState` and never touches the process environment directly.

use crate::services::mpesa;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_ACCESS_TOKEN_EXPIRE_MINUTES: u64 = 30;
pub const DEFAULT_LOGIN_RATE_LIMIT: usize = 10;
pub const DEFAULT_LOGIN_RATE_WINDOW_SECS: u64 = 60;
pub const DEFAULT_ALLOWED_ORIGINS: [&str; 2] = ["http://localhost:3000", "https://asili.education.ke"];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
    #[error("JWT_SECRET is required when ASILI_ENV=production")]
    MissingJwtSecret,
    #[error("JWT_SECRET must be at least 32 bytes")]
    WeakJwtSecret,
    #[error("BOOTSTRAP_ADMIN_EMAIL and BOOTSTRAP_ADMIN_PASSWORD must be set together")]
    PartialBootstrapAdmin,
    #[error("MPESA_CONSUMER_KEY, MPESA_CONSUMER_SECRET, MPESA_SHORTCODE and MPESA_PASSKEY must be set together")]
    PartialMpesa,
    #[error("M-Pesa needs MPESA_CALLBACK_URL or PUBLIC_BASE_URL for payment confirmations")]
    MissingMpesaCallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

/// Admin account created at startup when it does not already exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: String,
}

/// Daraja credentials for fee collection by STK push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MpesaSettings {
    pub base_url: String,
    pub consumer_key: String,
    pub consumer_secret: String,
    /// Paybill number; also the STK push `PartyB`.
    pub shortcode: String,
    pub passkey: String,
    pub callback_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub port: u16,
    pub environment: Environment,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    /// `None` means a random per-process secret is generated at startup.
    pub jwt_secret: Option<String>,
    pub access_token_expire_minutes: u64,
    pub allowed_origins: Vec<String>,
    pub login_rate_limit: usize,
    pub login_rate_window_secs: u64,
    pub bootstrap_admin: Option<BootstrapAdmin>,
    /// `None` disables the fee payment routes.
    pub mpesa: Option<MpesaSettings>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            environment: Environment::Development,
            database_url: None,
            db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            jwt_secret: None,
            access_token_expire_minutes: DEFAULT_ACCESS_TOKEN_EXPIRE_MINUTES,
            allowed_origins: DEFAULT_ALLOWED_ORIGINS.iter().map(|o| (*o).to_owned()).collect(),
            login_rate_limit: DEFAULT_LOGIN_RATE_LIMIT,
            login_rate_window_secs: DEFAULT_LOGIN_RATE_WINDOW_SECS,
            bootstrap_admin: None,
            mpesa: None,
        }
    }
}

impl Settings {
    /// Build settings from the process environment.
    ///
    /// Recognized variables:
    /// - `PORT` (default 8000)
    /// - `ASILI_ENV`: `development` (default) or `production`
    /// - `DATABASE_URL`: Postgres URL; in-memory user store when absent
    /// - `DB_MAX_CONNECTIONS` (default 5)
    /// - `JWT_SECRET`: required in production
    /// - `ACCESS_TOKEN_EXPIRE_MINUTES` (default 30)
    /// - `ALLOWED_ORIGINS`: comma-separated CORS origins
    /// - `LOGIN_RATE_LIMIT`, `LOGIN_RATE_WINDOW_SECS` (default 10 per 60s)
    /// - `BOOTSTRAP_ADMIN_EMAIL`, `BOOTSTRAP_ADMIN_PASSWORD`
    /// - `MPESA_CONSUMER_KEY`, `MPESA_CONSUMER_SECRET`, `MPESA_SHORTCODE`,
    ///   `MPESA_PASSKEY`: all or none
    /// - `MPESA_BASE_URL` (default Daraja sandbox)
    /// - `MPESA_CALLBACK_URL`, or `PUBLIC_BASE_URL` plus the callback route
    ///
    /// # Errors
    ///
    /// Returns an error when a variable is present but malformed, or when a
    /// production deployment lacks a strong JWT secret.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup. Used by `from_env` and tests.
    ///
    /// # Errors
    ///
    /// See [`Settings::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());

        let environment = match get("ASILI_ENV").as_deref() {
            None | Some("development" | "dev") => Environment::Development,
            Some("production" | "prod") => Environment::Production,
            Some(other) => return Err(ConfigError::Invalid { key: "ASILI_ENV", value: other.to_owned() }),
        };

        let jwt_secret = get("JWT_SECRET");
        match (&jwt_secret, environment) {
            (None, Environment::Production) => return Err(ConfigError::MissingJwtSecret),
            (Some(secret), _) if secret.len() < 32 => return Err(ConfigError::WeakJwtSecret),
            _ => {}
        }

        let allowed_origins = match get("ALLOWED_ORIGINS") {
            Some(raw) => {
                let origins = parse_origin_list(&raw);
                // Credentialed CORS cannot use a wildcard origin.
                if origins.iter().any(|o| o.contains('*')) {
                    return Err(ConfigError::Invalid { key: "ALLOWED_ORIGINS", value: raw });
                }
                origins
            }
            None => DEFAULT_ALLOWED_ORIGINS.iter().map(|o| (*o).to_owned()).collect(),
        };

        let bootstrap_admin = match (get("BOOTSTRAP_ADMIN_EMAIL"), get("BOOTSTRAP_ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(BootstrapAdmin { email, password }),
            (None, None) => None,
            _ => return Err(ConfigError::PartialBootstrapAdmin),
        };

        let mpesa = parse_mpesa(&get)?;

        Ok(Self {
            port: parse_or("PORT", get("PORT"), DEFAULT_PORT)?,
            environment,
            database_url: get("DATABASE_URL"),
            db_max_connections: parse_or("DB_MAX_CONNECTIONS", get("DB_MAX_CONNECTIONS"), DEFAULT_DB_MAX_CONNECTIONS)?,
            jwt_secret,
            access_token_expire_minutes: parse_or(
                "ACCESS_TOKEN_EXPIRE_MINUTES",
                get("ACCESS_TOKEN_EXPIRE_MINUTES"),
                DEFAULT_ACCESS_TOKEN_EXPIRE_MINUTES,
            )?,
            allowed_origins,
            login_rate_limit: parse_or("LOGIN_RATE_LIMIT", get("LOGIN_RATE_LIMIT"), DEFAULT_LOGIN_RATE_LIMIT)?,
            login_rate_window_secs: parse_or(
                "LOGIN_RATE_WINDOW_SECS",
                get("LOGIN_RATE_WINDOW_SECS"),
                DEFAULT_LOGIN_RATE_WINDOW_SECS,
            )?,
            bootstrap_admin,
            mpesa,
        })
    }
}

fn parse_mpesa<G>(get: &G) -> Result<Option<MpesaSettings>, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    let credentials = (
        get("MPESA_CONSUMER_KEY"),
        get("MPESA_CONSUMER_SECRET"),
        get("MPESA_SHORTCODE"),
        get("MPESA_PASSKEY"),
    );
    let (consumer_key, consumer_secret, shortcode, passkey) = match credentials {
        (Some(key), Some(secret), Some(shortcode), Some(passkey)) => (key, secret, shortcode, passkey),
        (None, None, None, None) => return Ok(None),
        _ => return Err(ConfigError::PartialMpesa),
    };
    if !shortcode.chars().all(|c| c.is_ascii_digit()) {
        return Err(ConfigError::Invalid { key: "MPESA_SHORTCODE", value: shortcode });
    }

    let callback_url = match (get("MPESA_CALLBACK_URL"), get("PUBLIC_BASE_URL")) {
        (Some(url), _) => url,
        (None, Some(base)) => format!("{}{}", base.trim_end_matches('/'), mpesa::CALLBACK_PATH),
        (None, None) => return Err(ConfigError::MissingMpesaCallback),
    };
    let base_url = get("MPESA_BASE_URL").unwrap_or_else(|| mpesa::DEFAULT_BASE_URL.to_owned());

    Ok(Some(MpesaSettings {
        base_url: base_url.trim_end_matches('/').to_owned(),
        consumer_key,
        consumer_secret,
        shortcode,
        passkey,
        callback_url,
    }))
}

fn parse_or<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
{
    match raw {
        None => Ok(default),
        Some(value) => value.parse::<T>().map_err(|_| ConfigError::Invalid { key, value }),
    }
}

fn parse_origin_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|origin| origin.trim().trim_end_matches('/'))
        .filter(|origin| !origin.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
