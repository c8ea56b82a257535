//! Composite scorer.
//!
//! For every driver in table order:
//!
//! ```text
//! z       = zscore(series, window)            (None with short history)
//! z_adj   = clamp_or_neutral(polarity * z, -3, 3)
//! contrib = weight * z_adj
//! ```
//!
//! and `score = clamp(sum(contrib), -2, 2)`. An undefined z contributes exactly
//! zero and the remaining weights are NOT renormalized, so missing data pulls
//! the composite toward neutral.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::{DriverRecord, IndicatorSpec, IndicatorTable, MonthlySeries};
use crate::transform::{clamp, clamp_or_neutral, zscore_series, DEFAULT_WINDOW};

/// Bound on a polarity-adjusted z-score.
pub const Z_LIMIT: f64 = 3.0;

/// Bound on the composite score.
pub const SCORE_LIMIT: f64 = 2.0;

/// Composite score with the driver snapshot that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeScore {
    /// In [−2, 2].
    pub value: f64,
    pub drivers: Vec<DriverRecord>,
}

impl CompositeScore {
    /// Drivers that had enough history to be scored.
    pub fn defined_drivers(&self) -> usize {
        self.drivers.iter().filter(|d| d.has_history()).count()
    }
}

pub struct CompositeScorer<'a> {
    table: &'a IndicatorTable,
    window: usize,
}

impl<'a> CompositeScorer<'a> {
    pub fn new(table: &'a IndicatorTable) -> Self {
        Self {
            table,
            window: DEFAULT_WINDOW,
        }
    }

    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    /// Score driver inputs keyed by driver key (see `transform::driver_inputs`).
    pub fn score(&self, inputs: &BTreeMap<String, MonthlySeries>) -> CompositeScore {
        let drivers: Vec<DriverRecord> = self
            .table
            .drivers
            .iter()
            .map(|spec| score_driver(spec, inputs.get(&spec.key), self.window))
            .collect();

        let total: f64 = drivers.iter().map(|d| d.contribution).sum();

        CompositeScore {
            value: clamp(total, -SCORE_LIMIT, SCORE_LIMIT),
            drivers,
        }
    }
}

/// Score a single driver. An absent series is treated like one with no history.
pub fn score_driver(
    spec: &IndicatorSpec,
    series: Option<&MonthlySeries>,
    window: usize,
) -> DriverRecord {
    let z_raw = series.and_then(|s| zscore_series(s, window));
    if z_raw.is_none() {
        warn!(
            driver = %spec.key,
            observations = series.map_or(0, |s| s.values().len()),
            "insufficient history; driver contributes zero"
        );
    }

    let z_adj = clamp_or_neutral(z_raw.map(|z| spec.polarity.sign() * z), -Z_LIMIT, Z_LIMIT);
    let latest = series.and_then(|s| s.latest());

    DriverRecord {
        key: spec.key.clone(),
        name: spec.name.clone(),
        z_raw,
        z_adj,
        weight: spec.weight,
        contribution: spec.weight * z_adj,
        latest_value: latest.map(|(_, v)| v),
        latest_month: latest.map(|(m, _)| m),
        delta: series.map_or(0.0, |s| s.last_change()),
    }
}
