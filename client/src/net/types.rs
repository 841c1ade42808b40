//! Wire types for the `asili` REST API.

use serde::{Deserialize, Serialize};

/// Body returned by `POST /api/v1/auth/token`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    #[serde(default)]
    pub expires_in: i64,
    pub role: String,
}

/// Error body the server attaches to non-2xx responses.
#[derive(Clone, Debug, Deserialize)]
pub struct ErrorDetail {
    pub detail: String,
}
