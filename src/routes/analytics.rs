//! Analytics routes: SDG 4 snapshot and attendance outliers.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use super::auth::BearerUser;
use super::error::ApiError;
use crate::models::UserRole;
use crate::services::anomaly;
use crate::services::metrics::{self, Sdg4Snapshot};

pub const MAX_ATTENDANCE_SAMPLES: usize = 10_000;

/// `GET /api/v1/analytics/sdg4`: public indicator snapshot.
pub async fn sdg4() -> Json<Sdg4Snapshot> {
    Json(metrics::current_snapshot())
}

#[derive(Debug, Deserialize)]
pub struct AttendanceSeries {
    pub rates: Vec<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnomalyReport {
    pub anomalies: Vec<bool>,
    pub flagged: usize,
}

/// `POST /api/v1/analytics/attendance/anomalies`: admins and teachers only.
pub async fn attendance_anomalies(
    auth: BearerUser,
    body: Result<Json<AttendanceSeries>, JsonRejection>,
) -> Result<Json<AnomalyReport>, ApiError> {
    auth.require_role(&[UserRole::Admin, UserRole::Teacher])?;

    let Json(series) = body?;
    if series.rates.len() > MAX_ATTENDANCE_SAMPLES {
        return Err(ApiError::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("at most {MAX_ATTENDANCE_SAMPLES} samples allowed"),
        ));
    }
    if series.rates.iter().any(|r| !r.is_finite()) {
        return Err(ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, "rates must be finite numbers"));
    }

    let anomalies = anomaly::detect_attendance_anomalies(&series.rates);
    let flagged = anomalies.iter().filter(|a| **a).count();
    tracing::debug!(samples = series.rates.len(), flagged, "attendance anomalies computed");
    Ok(Json(AnomalyReport { anomalies, flagged }))
}
