//! Run summary recorded with every successful run log entry.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use macroregime_core::data::DataSource;
use macroregime_core::domain::{DriverRecord, MonthlySeries};
use serde::{Deserialize, Serialize};

/// Identity and contribution of a single driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverRef {
    pub key: String,
    pub name: String,
    pub contribution: f64,
}

impl From<&DriverRecord> for DriverRef {
    fn from(d: &DriverRecord) -> Self {
        Self {
            key: d.key.clone(),
            name: d.name.clone(),
            contribution: d.contribution,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub score_now: f64,
    /// Where the series came from: the live API or a fixture file.
    pub source: DataSource,
    pub best_driver: Option<DriverRef>,
    pub worst_driver: Option<DriverRef>,
    pub benchmark_id: Option<String>,
    pub benchmark_latest: Option<f64>,
    pub benchmark_month: Option<NaiveDate>,
    pub generated_at_utc: DateTime<Utc>,
    pub target_year: i32,
    pub decay_k: f64,
    /// BLAKE3 over every monthly input the score was computed from.
    pub dataset_hash: String,
    /// Last minus previous monthly value, per driver.
    pub delta_proxy: BTreeMap<String, f64>,
}

/// Worst and best driver by contribution.
///
/// Stable ascending sort: the worst is the first element, the best the last,
/// so ties resolve by indicator-table order. `-0.0` and `0.0` compare equal.
pub fn extremes(drivers: &[DriverRecord]) -> Option<(DriverRef, DriverRef)> {
    let mut sorted: Vec<&DriverRecord> = drivers.iter().collect();
    sorted.sort_by(|a, b| {
        a.contribution
            .partial_cmp(&b.contribution)
            .unwrap_or(Ordering::Equal)
    });
    let worst = sorted.first()?;
    let best = sorted.last()?;
    Some(((*worst).into(), (*best).into()))
}

pub fn delta_proxy(drivers: &[DriverRecord]) -> BTreeMap<String, f64> {
    drivers.iter().map(|d| (d.key.clone(), d.delta)).collect()
}

/// Latest non-missing benchmark value and its month.
pub fn benchmark_latest(series: Option<&MonthlySeries>) -> (Option<f64>, Option<NaiveDate>) {
    match series.and_then(|s| s.latest()) {
        Some((month, value)) => (Some(value), Some(month)),
        None => (None, None),
    }
}
