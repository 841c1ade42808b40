//! SDG 4 indicator snapshot served to dashboards.
//!
//! The figures and feature labels come from `client::state::metrics`, so the
//! API payload and the rendered widget cannot drift apart.

use client::state::metrics::{KEY_FEATURES, Sdg4Metrics};
use serde::Serialize;

pub const GOAL: &str = "UN SDG 4 - Quality Education";

#[derive(Debug, Clone, Serialize)]
pub struct Sdg4Snapshot {
    pub goal: &'static str,
    pub metrics: Sdg4Metrics,
    pub key_features: &'static [&'static str],
}

#[must_use]
pub fn current_snapshot() -> Sdg4Snapshot {
    Sdg4Snapshot {
        goal: GOAL,
        metrics: Sdg4Metrics::CURRENT,
        key_features: &KEY_FEATURES,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_carries_fixed_indicators() {
        let snapshot = current_snapshot();
        assert_eq!(
            snapshot.metrics,
            Sdg4Metrics { enrollment: 95, attendance: 88, literacy: 76, completion: 82 }
        );
        assert_eq!(snapshot.key_features.len(), 6);
    }

    #[test]
    fn snapshot_serializes_same_labels_as_widget() {
        let json = serde_json::to_value(current_snapshot()).unwrap();
        assert_eq!(json["metrics"]["enrollment"], 95);
        assert_eq!(json["metrics"]["completion"], 82);
        assert_eq!(json["key_features"][0], KEY_FEATURES[0]);
        assert_eq!(json["key_features"][2], "💰 M-Pesa Fee Integration");
    }
}
