//! Indicator table: which series are fetched, how they are resampled, and how
//! the scored drivers derive from them.
//!
//! The table is immutable once built. `IndicatorTable::us_default()` is the
//! production configuration; tests build their own tables through the same
//! constructors and run them through `validate()`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Native sampling frequency of a fetched series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Monthly,
}

/// How observations inside one calendar month collapse to a single value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    /// Chronologically last non-missing value in the month.
    Last,
    /// Mean of the non-missing values in the month.
    Mean,
}

/// Direction in which an indicator is favorable for the tracked regime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    /// Higher is favorable (+1).
    Favorable,
    /// Higher is unfavorable (−1).
    Unfavorable,
}

impl Polarity {
    pub fn sign(self) -> f64 {
        match self {
            Polarity::Favorable => 1.0,
            Polarity::Unfavorable => -1.0,
        }
    }
}

/// Transform applied to a monthly source series before scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transform {
    /// Score the monthly level as-is.
    Level,
    /// Score the year-over-year percentage change of the level.
    YoyFromLevel,
}

/// A raw series pulled from the time-series API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSpec {
    pub id: String,
    pub name: String,
    pub frequency: Frequency,
    pub aggregation: Aggregation,
}

impl SeriesSpec {
    pub fn new(id: &str, name: &str, frequency: Frequency) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            frequency,
            aggregation: Aggregation::Last,
        }
    }

    pub fn with_aggregation(mut self, aggregation: Aggregation) -> Self {
        self.aggregation = aggregation;
        self
    }
}

/// A scored driver of the composite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSpec {
    /// Key recorded in driver snapshots (e.g. `CPI_YOY`).
    pub key: String,
    pub name: String,
    /// Id of the `SeriesSpec` this driver is computed from.
    pub source: String,
    pub transform: Transform,
    pub polarity: Polarity,
    pub weight: f64,
}

impl IndicatorSpec {
    pub fn new(key: &str, name: &str, source: &str, polarity: Polarity, weight: f64) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            source: source.to_string(),
            transform: Transform::Level,
            polarity,
            weight,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum TableError {
    #[error("indicator table has no scored drivers")]
    NoDrivers,

    #[error("driver '{key}' has invalid weight {weight} (must be finite and >= 0)")]
    InvalidWeight { key: String, weight: f64 },

    #[error("driver '{key}' references unknown series '{source_id}'")]
    UnknownSource { key: String, source_id: String },

    #[error("benchmark series '{0}' is not in the fetch list")]
    UnknownBenchmark(String),

    #[error("duplicate {kind} '{id}'")]
    Duplicate { kind: &'static str, id: String },
}

/// Fetch list, ordered scored drivers, and the benchmark series.
///
/// Driver order is significant: it is the order of the driver snapshot and the
/// tie-break order when ranking drivers by contribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorTable {
    pub series: Vec<SeriesSpec>,
    pub drivers: Vec<IndicatorSpec>,
    /// Reference series reported in the run summary; not scored.
    pub benchmark: Option<String>,
}

impl IndicatorTable {
    /// US macro table: inflation, labour, policy rate, curve, credit.
    pub fn us_default() -> Self {
        Self {
            series: vec![
                SeriesSpec::new("CPIAUCSL", "CPI (level)", Frequency::Monthly),
                SeriesSpec::new("UNRATE", "Unemployment rate", Frequency::Monthly),
                SeriesSpec::new("FEDFUNDS", "Fed Funds", Frequency::Monthly),
                SeriesSpec::new("T10Y2Y", "10Y-2Y spread", Frequency::Daily),
                SeriesSpec::new("BAMLH0A0HYM2", "HY OAS", Frequency::Daily),
                SeriesSpec::new("SP500", "S&P 500", Frequency::Daily),
            ],
            drivers: vec![
                IndicatorSpec::new(
                    "CPI_YOY",
                    "Inflation (CPI YoY)",
                    "CPIAUCSL",
                    Polarity::Unfavorable,
                    0.30,
                )
                .with_transform(Transform::YoyFromLevel),
                IndicatorSpec::new(
                    "UNRATE",
                    "Unemployment rate",
                    "UNRATE",
                    Polarity::Unfavorable,
                    0.25,
                ),
                IndicatorSpec::new(
                    "FEDFUNDS",
                    "Fed Funds",
                    "FEDFUNDS",
                    Polarity::Unfavorable,
                    0.20,
                ),
                IndicatorSpec::new(
                    "T10Y2Y",
                    "Yield curve (10Y-2Y)",
                    "T10Y2Y",
                    Polarity::Favorable,
                    0.15,
                ),
                IndicatorSpec::new(
                    "BAMLH0A0HYM2",
                    "Credit stress (HY OAS)",
                    "BAMLH0A0HYM2",
                    Polarity::Unfavorable,
                    0.10,
                ),
            ],
            benchmark: Some("SP500".to_string()),
        }
    }

    pub fn series_spec(&self, id: &str) -> Option<&SeriesSpec> {
        self.series.iter().find(|s| s.id == id)
    }

    pub fn series_ids(&self) -> impl Iterator<Item = &str> {
        self.series.iter().map(|s| s.id.as_str())
    }

    /// Sum of driver weights. Not required to be 1.
    pub fn total_weight(&self) -> f64 {
        self.drivers.iter().map(|d| d.weight).sum()
    }

    pub fn validate(&self) -> Result<(), TableError> {
        if self.drivers.is_empty() {
            return Err(TableError::NoDrivers);
        }

        for (i, s) in self.series.iter().enumerate() {
            if self.series[..i].iter().any(|other| other.id == s.id) {
                return Err(TableError::Duplicate {
                    kind: "series",
                    id: s.id.clone(),
                });
            }
        }

        for (i, d) in self.drivers.iter().enumerate() {
            if self.drivers[..i].iter().any(|other| other.key == d.key) {
                return Err(TableError::Duplicate {
                    kind: "driver",
                    id: d.key.clone(),
                });
            }
            if !d.weight.is_finite() || d.weight < 0.0 {
                return Err(TableError::InvalidWeight {
                    key: d.key.clone(),
                    weight: d.weight,
                });
            }
            if self.series_spec(&d.source).is_none() {
                return Err(TableError::UnknownSource {
                    key: d.key.clone(),
                    source_id: d.source.clone(),
                });
            }
        }

        if let Some(benchmark) = &self.benchmark {
            if self.series_spec(benchmark).is_none() {
                return Err(TableError::UnknownBenchmark(benchmark.clone()));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn us_default_is_valid() {
        let table = IndicatorTable::us_default();
        assert_eq!(table.validate(), Ok(()));
        assert_eq!(table.drivers.len(), 5);
        assert!((table.total_weight() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn us_default_weights_and_polarities() {
        let table = IndicatorTable::us_default();
        let weights: Vec<f64> = table.drivers.iter().map(|d| d.weight).collect();
        let signs: Vec<f64> = table.drivers.iter().map(|d| d.polarity.sign()).collect();
        assert_eq!(weights, vec![0.30, 0.25, 0.20, 0.15, 0.10]);
        assert_eq!(signs, vec![-1.0, -1.0, -1.0, 1.0, -1.0]);
        assert_eq!(table.drivers[0].transform, Transform::YoyFromLevel);
    }

    #[test]
    fn negative_weight_rejected() {
        let mut table = IndicatorTable::us_default();
        table.drivers[2].weight = -0.1;
        assert!(matches!(
            table.validate(),
            Err(TableError::InvalidWeight { .. })
        ));
    }

    #[test]
    fn unknown_source_rejected() {
        let mut table = IndicatorTable::us_default();
        table.drivers[1].source = "NOPE".into();
        assert_eq!(
            table.validate(),
            Err(TableError::UnknownSource {
                key: "UNRATE".into(),
                source_id: "NOPE".into()
            })
        );
    }

    #[test]
    fn duplicate_driver_rejected() {
        let mut table = IndicatorTable::us_default();
        let dup = table.drivers[0].clone();
        table.drivers.push(dup);
        assert!(matches!(
            table.validate(),
            Err(TableError::Duplicate { kind: "driver", .. })
        ));
    }

    #[test]
    fn unknown_benchmark_rejected() {
        let mut table = IndicatorTable::us_default();
        table.benchmark = Some("DJIA".into());
        assert_eq!(
            table.validate(),
            Err(TableError::UnknownBenchmark("DJIA".into()))
        );
    }
}
