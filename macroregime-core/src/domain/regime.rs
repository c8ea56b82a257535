//! Qualitative regime buckets derived from the composite score.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Scores at or above this are bullish.
pub const BULL_THRESHOLD: f64 = 0.5;
/// Scores at or below this are bearish.
pub const BEAR_THRESHOLD: f64 = -0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Regime {
    Bull,
    Neutral,
    Bear,
}

impl Regime {
    /// Classify a score. Both thresholds are inclusive on their own side.
    pub fn from_score(score: f64) -> Self {
        if score >= BULL_THRESHOLD {
            Regime::Bull
        } else if score <= BEAR_THRESHOLD {
            Regime::Bear
        } else {
            Regime::Neutral
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Regime::Bull => "bull",
            Regime::Neutral => "neutral",
            Regime::Bear => "bear",
        }
    }
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}
