//! Signed access tokens (compact JWT, HS256).
//!
//! ARCHITECTURE
//! ============
//! The login route issues a token after password verification; the
//! `BearerUser` extractor verifies it on every authenticated request. Claims
//! carry the role so handlers can authorize without a store lookup.
//!
//! TRADE-OFFS
//! ==========
//! Tokens are stateless and cannot be revoked before `exp`. Lifetimes are kept
//! short (30 minutes by default) to bound that window.

use std::fmt::Write;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use uuid::Uuid;

use crate::models::{User, UserRole};

type HmacSha256 = Hmac<Sha256>;

const HEADER_JSON: &str = r#"{"alg":"HS256","typ":"JWT"}"#;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("unsupported token algorithm")]
    UnsupportedAlgorithm,
    #[error("invalid token signature")]
    BadSignature,
    #[error("token expired")]
    Expired,
    #[error("token encoding failed: {0}")]
    Encode(String),
}

/// Claims embedded in every access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Account email.
    pub sub: String,
    /// Account id.
    pub uid: Uuid,
    pub role: UserRole,
    /// Issued-at, seconds since the Unix epoch.
    pub iat: u64,
    /// Expiry, seconds since the Unix epoch.
    pub exp: u64,
}

#[derive(Debug, Deserialize)]
struct Header {
    alg: String,
}

/// A freshly issued token plus the metadata returned to the caller.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_in: u64,
    pub claims: Claims,
}

#[derive(Clone)]
pub struct TokenSigner {
    key: Vec<u8>,
    ttl: Duration,
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner").field("ttl", &self.ttl).finish_non_exhaustive()
    }
}

impl TokenSigner {
    #[must_use]
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self { key: secret.to_vec(), ttl }
    }

    /// Signer with a random 32-byte key. Tokens do not survive a restart.
    #[must_use]
    pub fn ephemeral(ttl: Duration) -> Self {
        let bytes: [u8; 32] = rand::rng().random();
        Self::new(&bytes, ttl)
    }

    /// Issue a token for `user` valid from now.
    ///
    /// # Errors
    ///
    /// Returns an error if the claims cannot be serialized.
    pub fn issue(&self, user: &User) -> Result<IssuedToken, TokenError> {
        self.issue_at(user, unix_now())
    }

    pub(crate) fn issue_at(&self, user: &User, now: u64) -> Result<IssuedToken, TokenError> {
        let expires_in = self.ttl.as_secs();
        let claims = Claims {
            sub: user.email.clone(),
            uid: user.id,
            role: user.role,
            iat: now,
            exp: now.saturating_add(expires_in),
        };
        let payload = serde_json::to_vec(&claims).map_err(|e| TokenError::Encode(e.to_string()))?;

        let mut token = String::new();
        let _ = write!(
            token,
            "{}.{}",
            URL_SAFE_NO_PAD.encode(HEADER_JSON),
            URL_SAFE_NO_PAD.encode(payload)
        );
        let signature = self.sign(token.as_bytes())?;
        token.push('.');
        token.push_str(&URL_SAFE_NO_PAD.encode(signature));

        Ok(IssuedToken { token, expires_in, claims })
    }

    /// Verify signature and expiry, returning the embedded claims.
    ///
    /// # Errors
    ///
    /// Returns a [`TokenError`] describing why the token was rejected.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, unix_now())
    }

    pub(crate) fn verify_at(&self, token: &str, now: u64) -> Result<Claims, TokenError> {
        let mut parts = token.split('.');
        let (Some(header_b64), Some(payload_b64), Some(signature_b64), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TokenError::Malformed);
        };

        let header_bytes = URL_SAFE_NO_PAD.decode(header_b64).map_err(|_| TokenError::Malformed)?;
        let header: Header = serde_json::from_slice(&header_bytes).map_err(|_| TokenError::Malformed)?;
        if header.alg != "HS256" {
            return Err(TokenError::UnsupportedAlgorithm);
        }

        let signature = URL_SAFE_NO_PAD.decode(signature_b64).map_err(|_| TokenError::Malformed)?;
        let signing_input_len = header_b64.len() + 1 + payload_b64.len();
        let mut mac = self.mac()?;
        mac.update(&token.as_bytes()[..signing_input_len]);
        mac.verify_slice(&signature).map_err(|_| TokenError::BadSignature)?;

        let payload = URL_SAFE_NO_PAD.decode(payload_b64).map_err(|_| TokenError::Malformed)?;
        let claims: Claims = serde_json::from_slice(&payload).map_err(|_| TokenError::Malformed)?;
        if claims.exp <= now {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }

    fn mac(&self) -> Result<HmacSha256, TokenError> {
        HmacSha256::new_from_slice(&self.key).map_err(|e| TokenError::Encode(e.to_string()))
    }

    fn sign(&self, input: &[u8]) -> Result<Vec<u8>, TokenError> {
        let mut mac = self.mac()?;
        mac.update(input);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
}

#[cfg(test)]
#[path = "token_test.rs"]
mod tests;
