//! Series provider trait and structured error types.
//!
//! The `SeriesProvider` trait abstracts over the time-series source (the FRED
//! API, an in-memory fixture) so the orchestrator can be driven without
//! network access in tests.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::ObservationSeries;

/// Structured error types for fetch operations.
///
/// Every variant is fatal for a run; there is no partial-indicator retry.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("HTTP {status} for series '{series_id}': {message}")]
    HttpStatus {
        series_id: String,
        status: u16,
        message: String,
    },

    #[error("authentication rejected: {0}")]
    AuthenticationRequired(String),

    #[error("series not found: {series_id}")]
    SeriesNotFound { series_id: String },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("http client setup failed: {0}")]
    Client(String),

    #[error("reading fixture {}: {source}", path.display())]
    FixtureIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Where a series came from. Recorded in every run summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Fred,
    Fixture,
}

/// Trait for time-series providers.
///
/// `fetch` returns the full observation history of one series, sorted
/// ascending, with unparseable dates dropped and non-numeric values missing.
pub trait SeriesProvider {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Origin of the data this provider serves.
    fn source(&self) -> DataSource;

    fn fetch(&self, series_id: &str) -> Result<ObservationSeries, FetchError>;
}
