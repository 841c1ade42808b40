//! SDG 4 indicator model for the dashboard widget.
//!
//! DESIGN
//! ======
//! The widget starts at zero and switches to the fixed indicator values once
//! `LOAD_DELAY` has elapsed. `MetricsState::at` expresses that as a pure
//! function of elapsed time; the component drives it with a browser timer.

#[cfg(test)]
#[path = "metrics_test.rs"]
mod metrics_test;

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const LOAD_DELAY: Duration = Duration::from_millis(1000);

pub const KEY_FEATURES: [&str; 6] = [
    "📊 CBC Competency Tracking",
    "👨‍🏫 Teacher CPD Management",
    "💰 M-Pesa Fee Integration",
    "📱 Offline-First Design",
    "🔐 Data Protection Compliant",
    "🌍 SDG 4 Analytics",
];

/// Four headline percentages. Mirrors the server's `/api/v1/analytics/sdg4` payload.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sdg4Metrics {
    pub enrollment: u8,
    pub attendance: u8,
    pub literacy: u8,
    pub completion: u8,
}

impl Sdg4Metrics {
    pub const CURRENT: Self = Self { enrollment: 95, attendance: 88, literacy: 76, completion: 82 };

    /// `(value, label, tone)` per tile in display order.
    #[must_use]
    pub fn tiles(&self) -> [(u8, &'static str, &'static str); 4] {
        [
            (self.enrollment, "Enrollment Rate", "blue"),
            (self.attendance, "Attendance", "green"),
            (self.literacy, "Literacy Rate", "purple"),
            (self.completion, "Completion Rate", "orange"),
        ]
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MetricsState {
    pub metrics: Sdg4Metrics,
    pub loaded: bool,
}

impl MetricsState {
    #[must_use]
    pub fn loaded() -> Self {
        Self { metrics: Sdg4Metrics::CURRENT, loaded: true }
    }

    /// State shown `elapsed` after the widget mounted.
    #[must_use]
    pub fn at(elapsed: Duration) -> Self {
        if elapsed >= LOAD_DELAY { Self::loaded() } else { Self::default() }
    }
}

#[must_use]
pub fn format_percent(value: u8) -> String {
    format!("{value}%")
}
