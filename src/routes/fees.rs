//! Fee payment routes backed by M-Pesa STK push.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use super::auth::BearerUser;
use super::error::ApiError;
use crate::models::UserRole;
use crate::services::mpesa::{MpesaError, StkCallbackEnvelope, StkPushReceipt};
use crate::state::AppState;

#[cfg(test)]
#[path = "fees_test.rs"]
mod tests;

#[derive(Debug, Deserialize)]
pub struct StkPushBody {
    pub phone_number: String,
    /// Whole shillings.
    pub amount: u64,
    pub account_reference: String,
}

impl From<MpesaError> for ApiError {
    fn from(error: MpesaError) -> Self {
        if error.is_invalid_input() {
            return Self::new(StatusCode::UNPROCESSABLE_ENTITY, error.to_string());
        }
        tracing::error!(%error, "m-pesa request failed");
        Self::new(StatusCode::BAD_GATEWAY, "M-Pesa request failed")
    }
}

/// `POST /api/v1/fees/mpesa/stk-push`: admins and parents only.
pub async fn stk_push(
    State(state): State<AppState>,
    auth: BearerUser,
    body: Result<Json<StkPushBody>, JsonRejection>,
) -> Result<Json<StkPushReceipt>, ApiError> {
    auth.require_role(&[UserRole::Admin, UserRole::Parent])?;
    let Some(client) = state.mpesa.as_ref() else {
        return Err(ApiError::new(StatusCode::SERVICE_UNAVAILABLE, "M-Pesa payments are not configured"));
    };

    let Json(body) = body?;
    let receipt = client
        .initiate_stk_push(&body.phone_number, body.amount, &body.account_reference)
        .await?;
    tracing::info!(user = %auth.claims.sub, checkout_request_id = %receipt.checkout_request_id, "fee payment requested");
    Ok(Json(receipt))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CallbackAck {
    #[serde(rename = "ResultCode")]
    pub result_code: i64,
    #[serde(rename = "ResultDesc")]
    pub result_desc: String,
}

/// `POST /api/v1/fees/mpesa-callback`: Daraja's asynchronous payment result.
pub async fn mpesa_callback(
    body: Result<Json<StkCallbackEnvelope>, JsonRejection>,
) -> Result<Json<CallbackAck>, ApiError> {
    let Json(envelope) = body?;
    let callback = envelope.body.stk_callback;
    if callback.succeeded() {
        tracing::info!(
            merchant_request_id = %callback.merchant_request_id,
            checkout_request_id = %callback.checkout_request_id,
            receipt = callback.receipt_number().unwrap_or("-"),
            amount = callback.amount(),
            "m-pesa payment confirmed"
        );
    } else {
        tracing::warn!(
            checkout_request_id = %callback.checkout_request_id,
            result_code = callback.result_code,
            result_desc = %callback.result_desc,
            "m-pesa payment not completed"
        );
    }
    Ok(Json(CallbackAck { result_code: 0, result_desc: "Accepted".to_owned() }))
}
