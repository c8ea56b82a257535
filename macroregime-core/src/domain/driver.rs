//! Per-indicator contribution snapshot.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One scored driver as recorded alongside every projected month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverRecord {
    pub key: String,
    pub name: String,
    /// `None` when there was not enough history for a z-score.
    pub z_raw: Option<f64>,
    /// Polarity-adjusted z, clamped to [−3, 3]; 0.0 when `z_raw` is `None`.
    pub z_adj: f64,
    pub weight: f64,
    pub contribution: f64,
    pub latest_value: Option<f64>,
    pub latest_month: Option<NaiveDate>,
    /// Latest value minus the previous month's value.
    #[serde(default)]
    pub delta: f64,
}

impl DriverRecord {
    pub fn has_history(&self) -> bool {
        self.z_raw.is_some()
    }
}
