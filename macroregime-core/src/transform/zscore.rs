//! Trailing-window z-score and the clamp rules used by the scorer.
//!
//! An undefined statistic is `None`, never NaN. The scorer turns `None` into a
//! zero contribution through `clamp_or_neutral`.

use crate::domain::MonthlySeries;

/// Ten years of monthly observations.
pub const DEFAULT_WINDOW: usize = 120;

/// Absolute floor on the number of observations needed for a z-score.
pub const MIN_HISTORY: usize = 24;

/// Observations required before a z-score is defined: `max(24, window / 4)`.
pub fn min_history(window: usize) -> usize {
    MIN_HISTORY.max(window / 4)
}

/// z-score of the last value against the trailing `window` values.
///
/// Non-finite inputs are skipped. Uses the population standard deviation.
/// Returns `None` with insufficient history or zero dispersion.
pub fn zscore(values: &[f64], window: usize) -> Option<f64> {
    let s: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if s.len() < min_history(window) {
        return None;
    }

    let tail = &s[s.len().saturating_sub(window.max(1))..];
    let n = tail.len() as f64;
    let mean = tail.iter().sum::<f64>() / n;
    let var = tail.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let sd = var.sqrt();
    if sd == 0.0 || !sd.is_finite() {
        return None;
    }

    let last = *s.last()?;
    Some((last - mean) / sd)
}

/// z-score of the latest non-missing month of `series`.
pub fn zscore_series(series: &MonthlySeries, window: usize) -> Option<f64> {
    zscore(&series.values(), window)
}

pub fn clamp(x: f64, lo: f64, hi: f64) -> f64 {
    x.max(lo).min(hi)
}

/// Undefined statistics contribute zero: `None` (or a non-finite value) maps
/// to 0.0, anything else is clamped to `[lo, hi]`.
pub fn clamp_or_neutral(x: Option<f64>, lo: f64, hi: f64) -> f64 {
    match x {
        Some(v) if v.is_finite() => clamp(v, lo, hi),
        _ => 0.0,
    }
}
