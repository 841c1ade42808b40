//! M-Pesa Daraja client for school-fee STK push requests.
//!
//! SYSTEM CONTEXT
//! ==============
//! The fees route asks Daraja to prompt a payer's phone for a PIN. Daraja
//! answers immediately with a checkout id and later POSTs the outcome to the
//! configured callback URL.
//!
//! Daraja OAuth tokens live for about an hour; one is cached per client and
//! refreshed shortly before it expires.

use std::time::{Duration, Instant};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use time::format_description::BorrowedFormatItem;
use time::macros::{format_description, offset};
use time::{OffsetDateTime, UtcOffset};
use tokio::sync::Mutex;

use crate::config::MpesaSettings;

#[cfg(test)]
#[path = "mpesa_test.rs"]
mod tests;

pub const DEFAULT_BASE_URL: &str = "https://sandbox.safaricom.co.ke";
pub const CALLBACK_PATH: &str = "/api/v1/fees/mpesa-callback";
pub const TOKEN_PATH: &str = "/oauth/v1/generate";
pub const STK_PUSH_PATH: &str = "/mpesa/stkpush/v1/processrequest";

/// Daraja rejects longer `AccountReference` values.
pub const MAX_ACCOUNT_REFERENCE_LEN: usize = 12;

const TRANSACTION_TYPE: &str = "CustomerPayBillOnline";
const TRANSACTION_DESC: &str = "School Fees Payment";
const REQUEST_TIMEOUT_SECS: u64 = 30;
const CONNECT_TIMEOUT_SECS: u64 = 10;
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Daraja timestamps are East Africa Time.
const EAT: UtcOffset = offset!(+3);
const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[year][month][day][hour][minute][second]");

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum MpesaError {
    #[error("invalid phone number {0:?}; use 07XXXXXXXX or 2547XXXXXXXX")]
    InvalidPhone(String),
    #[error("amount must be at least 1 shilling")]
    InvalidAmount,
    #[error("account reference must be 1 to {max} characters", max = MAX_ACCOUNT_REFERENCE_LEN)]
    InvalidAccountReference,
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
    #[error("Daraja request failed: {0}")]
    Request(String),
    #[error("Daraja returned HTTP {status}")]
    Response { status: u16, body: String },
    #[error("Daraja response parse failed: {0}")]
    Parse(String),
    #[error("STK push rejected with code {code}: {description}")]
    Rejected { code: String, description: String },
    #[error("timestamp formatting failed: {0}")]
    Timestamp(#[from] time::error::Format),
}

impl MpesaError {
    /// Whether the caller sent bad input, as opposed to Daraja failing.
    #[must_use]
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidPhone(_) | Self::InvalidAmount | Self::InvalidAccountReference)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: ExpiresIn,
}

/// The sandbox sends `expires_in` as a string; accept a number too.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ExpiresIn {
    Seconds(u64),
    Text(String),
}

impl ExpiresIn {
    fn seconds(&self) -> Result<u64, MpesaError> {
        match self {
            Self::Seconds(secs) => Ok(*secs),
            Self::Text(raw) => raw
                .trim()
                .parse()
                .map_err(|_| MpesaError::Parse(format!("expires_in {raw:?}"))),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct StkPushRequest<'a> {
    business_short_code: &'a str,
    password: String,
    timestamp: String,
    transaction_type: &'a str,
    amount: u64,
    party_a: &'a str,
    party_b: &'a str,
    phone_number: &'a str,
    #[serde(rename = "CallBackURL")]
    callback_url: &'a str,
    account_reference: &'a str,
    transaction_desc: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct StkPushResponse {
    #[serde(rename = "MerchantRequestID")]
    merchant_request_id: String,
    #[serde(rename = "CheckoutRequestID")]
    checkout_request_id: String,
    response_code: String,
    response_description: String,
    #[serde(default)]
    customer_message: String,
}

/// Accepted STK push, returned to the API caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StkPushReceipt {
    pub merchant_request_id: String,
    pub checkout_request_id: String,
    pub customer_message: String,
}

/// Body Daraja POSTs to the callback URL.
#[derive(Debug, Deserialize)]
pub struct StkCallbackEnvelope {
    #[serde(rename = "Body")]
    pub body: StkCallbackBody,
}

#[derive(Debug, Deserialize)]
pub struct StkCallbackBody {
    #[serde(rename = "stkCallback")]
    pub stk_callback: StkCallback,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StkCallback {
    #[serde(rename = "MerchantRequestID")]
    pub merchant_request_id: String,
    #[serde(rename = "CheckoutRequestID")]
    pub checkout_request_id: String,
    pub result_code: i64,
    pub result_desc: String,
    #[serde(default)]
    pub callback_metadata: Option<CallbackMetadata>,
}

#[derive(Debug, Deserialize)]
pub struct CallbackMetadata {
    #[serde(rename = "Item", default)]
    pub items: Vec<CallbackItem>,
}

#[derive(Debug, Deserialize)]
pub struct CallbackItem {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Value", default)]
    pub value: Option<serde_json::Value>,
}

impl StkCallback {
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.result_code == 0
    }

    fn item(&self, name: &str) -> Option<&serde_json::Value> {
        self.callback_metadata
            .as_ref()?
            .items
            .iter()
            .find(|item| item.name == name)?
            .value
            .as_ref()
    }

    #[must_use]
    pub fn receipt_number(&self) -> Option<&str> {
        self.item("MpesaReceiptNumber")?.as_str()
    }

    #[must_use]
    pub fn amount(&self) -> Option<f64> {
        self.item("Amount")?.as_f64()
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// Normalize a Kenyan mobile number to the `2547XXXXXXXX` / `2541XXXXXXXX`
/// form Daraja expects.
///
/// # Errors
///
/// Returns `InvalidPhone` for anything that is not a Kenyan mobile number.
pub fn normalize_phone(raw: &str) -> Result<String, MpesaError> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace() && *c != '-').collect();
    let digits = compact.strip_prefix('+').unwrap_or(&compact);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(MpesaError::InvalidPhone(raw.to_owned()));
    }

    let national = if let Some(rest) = digits.strip_prefix("254") {
        rest
    } else if let Some(rest) = digits.strip_prefix('0') {
        rest
    } else {
        digits
    };
    if national.len() != 9 || !(national.starts_with('7') || national.starts_with('1')) {
        return Err(MpesaError::InvalidPhone(raw.to_owned()));
    }
    Ok(format!("254{national}"))
}

/// `YYYYMMDDHHMMSS` in East Africa Time.
///
/// # Errors
///
/// Propagates formatting failures from `time`.
pub fn daraja_timestamp(now: OffsetDateTime) -> Result<String, MpesaError> {
    Ok(now.to_offset(EAT).format(TIMESTAMP_FORMAT)?)
}

/// STK push password: `base64(shortcode + passkey + timestamp)`.
#[must_use]
pub fn stk_password(shortcode: &str, passkey: &str, timestamp: &str) -> String {
    STANDARD.encode(format!("{shortcode}{passkey}{timestamp}"))
}

fn validate_account_reference(reference: &str) -> Result<&str, MpesaError> {
    let reference = reference.trim();
    if reference.is_empty() || reference.chars().count() > MAX_ACCOUNT_REFERENCE_LEN {
        return Err(MpesaError::InvalidAccountReference);
    }
    Ok(reference)
}

// =============================================================================
// CLIENT
// =============================================================================

struct CachedToken {
    value: String,
    refresh_at: Instant,
}

pub struct MpesaClient {
    http: reqwest::Client,
    settings: MpesaSettings,
    token: Mutex<Option<CachedToken>>,
}

impl MpesaClient {
    /// # Errors
    ///
    /// Returns `HttpClientBuild` if the TLS backend cannot be initialized.
    pub fn new(settings: MpesaSettings) -> Result<Self, MpesaError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| MpesaError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, settings, token: Mutex::new(None) })
    }

    /// Return a cached OAuth token, fetching a new one when it is close to expiry.
    ///
    /// # Errors
    ///
    /// Fails when Daraja is unreachable, rejects the consumer credentials, or
    /// sends an unexpected body.
    pub async fn access_token(&self) -> Result<String, MpesaError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| Instant::now() < t.refresh_at) {
            return Ok(token.value.clone());
        }

        let response = self
            .http
            .get(format!("{}{TOKEN_PATH}", self.settings.base_url))
            .query(&[("grant_type", "client_credentials")])
            .basic_auth(&self.settings.consumer_key, Some(&self.settings.consumer_secret))
            .send()
            .await
            .map_err(|e| MpesaError::Request(e.to_string()))?;
        let text = read_success_body(response).await?;
        let parsed: TokenResponse = serde_json::from_str(&text).map_err(|e| MpesaError::Parse(e.to_string()))?;

        let lifetime = Duration::from_secs(parsed.expires_in.seconds()?);
        let refresh_at = Instant::now() + lifetime.saturating_sub(TOKEN_REFRESH_MARGIN);
        tracing::debug!(expires_in = lifetime.as_secs(), "daraja access token refreshed");
        *cached = Some(CachedToken { value: parsed.access_token.clone(), refresh_at });
        Ok(parsed.access_token)
    }

    /// Ask Daraja to prompt `phone` for a paybill payment of `amount` shillings.
    ///
    /// # Errors
    ///
    /// Input problems are reported before any network call. Otherwise fails
    /// on transport errors, non-200 replies, or a non-zero `ResponseCode`.
    pub async fn initiate_stk_push(
        &self,
        phone: &str,
        amount: u64,
        account_reference: &str,
    ) -> Result<StkPushReceipt, MpesaError> {
        let phone = normalize_phone(phone)?;
        if amount == 0 {
            return Err(MpesaError::InvalidAmount);
        }
        let account_reference = validate_account_reference(account_reference)?;

        let token = self.access_token().await?;
        let timestamp = daraja_timestamp(OffsetDateTime::now_utc())?;
        let shortcode = self.settings.shortcode.as_str();
        let request = StkPushRequest {
            business_short_code: shortcode,
            password: stk_password(shortcode, &self.settings.passkey, &timestamp),
            timestamp,
            transaction_type: TRANSACTION_TYPE,
            amount,
            party_a: &phone,
            party_b: shortcode,
            phone_number: &phone,
            callback_url: &self.settings.callback_url,
            account_reference,
            transaction_desc: TRANSACTION_DESC,
        };

        let response = self
            .http
            .post(format!("{}{STK_PUSH_PATH}", self.settings.base_url))
            .bearer_auth(&token)
            .json(&request)
            .send()
            .await
            .map_err(|e| MpesaError::Request(e.to_string()))?;
        let text = read_success_body(response).await?;
        let parsed: StkPushResponse = serde_json::from_str(&text).map_err(|e| MpesaError::Parse(e.to_string()))?;
        if parsed.response_code != "0" {
            return Err(MpesaError::Rejected {
                code: parsed.response_code,
                description: parsed.response_description,
            });
        }

        tracing::info!(
            checkout_request_id = %parsed.checkout_request_id,
            account_reference,
            amount,
            "stk push accepted"
        );
        Ok(StkPushReceipt {
            merchant_request_id: parsed.merchant_request_id,
            checkout_request_id: parsed.checkout_request_id,
            customer_message: parsed.customer_message,
        })
    }
}

async fn read_success_body(response: reqwest::Response) -> Result<String, MpesaError> {
    let status = response.status().as_u16();
    let text = response
        .text()
        .await
        .map_err(|e| MpesaError::Request(e.to_string()))?;
    if status != 200 {
        return Err(MpesaError::Response { status, body: text });
    }
    Ok(text)
}
