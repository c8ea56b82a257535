//! Regime projector: exponential decay of the current score toward neutral.
//!
//! `value[i] = score_now * exp(-k * i)` for `i = 0..horizon`, so the first
//! projected month equals the current score. This is extrapolation with no new
//! information, not a forecast.

use serde::{Deserialize, Serialize};

use crate::domain::Regime;

pub const DEFAULT_HORIZON: usize = 12;
pub const DEFAULT_DECAY_K: f64 = 0.22;

/// One step of the projected curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectedPoint {
    /// 1-based month offset from the start of the projection.
    pub step: usize,
    pub score: f64,
    pub regime: Regime,
}

/// Raw decay values.
pub fn decay_curve(score_now: f64, horizon: usize, decay_k: f64) -> Vec<f64> {
    (0..horizon)
        .map(|i| score_now * (-decay_k * i as f64).exp())
        .collect()
}

/// Decay curve with each value classified independently.
pub fn project(score_now: f64, horizon: usize, decay_k: f64) -> Vec<ProjectedPoint> {
    decay_curve(score_now, horizon, decay_k)
        .into_iter()
        .enumerate()
        .map(|(i, score)| ProjectedPoint {
            step: i + 1,
            score,
            regime: Regime::from_score(score),
        })
        .collect()
}

/// Decay rate whose curve halves every `months`.
pub fn decay_from_half_life(months: f64) -> f64 {
    std::f64::consts::LN_2 / months
}

/// Months for the curve to halve at decay rate `k`.
pub fn half_life(decay_k: f64) -> f64 {
    std::f64::consts::LN_2 / decay_k
}
