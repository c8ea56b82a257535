//! macroregime core — macro regime scoring engine.
//!
//! This crate contains the algorithmic part of the pipeline:
//! - Domain types (indicator table, observation/monthly series, driver records, rows)
//! - Series providers (FRED client, in-memory fixtures)
//! - Monthly resampling, YoY change, trailing z-scores
//! - Composite scorer with polarity, weights and clamps
//! - Exponential-decay regime projection
//!
//! Persistence and run orchestration live in `macroregime-runner`.

pub mod data;
pub mod domain;
pub mod fingerprint;
pub mod projection;
pub mod scoring;
pub mod transform;

pub use domain::{DriverRecord, IndicatorTable, MonthlySeries, ObservationSeries, Regime};
pub use projection::{project, ProjectedPoint};
pub use scoring::{CompositeScore, CompositeScorer};
