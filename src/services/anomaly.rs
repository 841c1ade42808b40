//! Attendance outlier detection.
//!
//! A sample is anomalous when it lies more than two population standard
//! deviations from the series mean. Series shorter than [`MIN_SAMPLES`] are
//! never flagged.

pub const MIN_SAMPLES: usize = 5;
pub const STD_DEV_THRESHOLD: f64 = 2.0;

/// Flag each attendance rate that deviates from the mean by more than
/// `STD_DEV_THRESHOLD` standard deviations. Output has the input's length.
#[must_use]
pub fn detect_attendance_anomalies(rates: &[f64]) -> Vec<bool> {
    if rates.len() < MIN_SAMPLES {
        return vec![false; rates.len()];
    }

    #[allow(clippy::cast_precision_loss)]
    let n = rates.len() as f64;
    let mean = rates.iter().sum::<f64>() / n;
    let variance = rates.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let limit = STD_DEV_THRESHOLD * variance.sqrt();

    rates.iter().map(|r| (r - mean).abs() > limit).collect()
}

#[cfg(test)]
#[path = "anomaly_test.rs"]
mod tests;
