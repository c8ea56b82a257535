//! Persisted output rows: projected months and the run log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::driver::DriverRecord;
use super::regime::Regime;

/// One month of the projected curve. Keyed by `(year, month)`.
///
/// Column names follow the store schema the dashboard reads (`anio`, `mes`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedMonthRow {
    #[serde(rename = "anio")]
    pub year: i32,
    /// 1..=12
    #[serde(rename = "mes")]
    pub month: u32,
    pub score: f64,
    pub regime: Regime,
    pub drivers: Vec<DriverRecord>,
    pub updated_at: DateTime<Utc>,
}

impl ProjectedMonthRow {
    pub fn key(&self) -> (i32, u32) {
        (self.year, self.month)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Success,
    Error,
}

/// Append-only audit record, one per execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunLogEntry {
    pub status: RunStatus,
    /// Structured summary; `{}` for failed runs.
    pub summary: serde_json::Value,
    pub error: Option<String>,
}

impl RunLogEntry {
    pub fn success(summary: serde_json::Value) -> Self {
        Self {
            status: RunStatus::Success,
            summary,
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            status: RunStatus::Error,
            summary: serde_json::Value::Object(serde_json::Map::new()),
            error: Some(message.into()),
        }
    }
}
