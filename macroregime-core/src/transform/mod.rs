//! Series transforms: monthly resampling, YoY change, z-scores.
//!
//! `normalize_sources` and `driver_inputs` apply the indicator table to raw
//! fetched series; the individual transforms are pure functions over
//! `ObservationSeries` / `MonthlySeries`.

pub mod resample;
pub mod yoy;
pub mod zscore;

pub use resample::to_monthly;
pub use yoy::yoy_from_level;
pub use zscore::{clamp, clamp_or_neutral, min_history, zscore, zscore_series, DEFAULT_WINDOW};

use std::collections::BTreeMap;

use crate::domain::{IndicatorTable, MonthlySeries, ObservationSeries, Transform};

/// Resample every fetched series to monthly using its configured aggregation.
///
/// Series missing from `raw` are skipped; series not in the table are ignored.
pub fn normalize_sources(
    table: &IndicatorTable,
    raw: &BTreeMap<String, ObservationSeries>,
) -> BTreeMap<String, MonthlySeries> {
    table
        .series
        .iter()
        .filter_map(|spec| {
            raw.get(&spec.id)
                .map(|s| (spec.id.clone(), to_monthly(s, spec.aggregation)))
        })
        .collect()
}

/// Build the monthly series each scored driver is computed from, keyed by
/// driver key.
pub fn driver_inputs(
    table: &IndicatorTable,
    monthly: &BTreeMap<String, MonthlySeries>,
) -> BTreeMap<String, MonthlySeries> {
    table
        .drivers
        .iter()
        .filter_map(|d| {
            let source = monthly.get(&d.source)?;
            let series = match d.transform {
                Transform::Level => source.clone(),
                Transform::YoyFromLevel => yoy_from_level(source),
            };
            Some((d.key.clone(), series))
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for transform tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
