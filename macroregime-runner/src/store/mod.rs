//! Persistence for projected month rows and the run log.
//!
//! Rows are upserted on `(year, month)`, so re-running for the same target
//! year replaces the 12 rows in place. Run log entries are append-only.

pub mod local;
pub mod memory;
pub mod rest;

pub use local::LocalStore;
pub use memory::MemoryStore;
pub use rest::RestStore;

use std::path::PathBuf;

use macroregime_core::domain::{ProjectedMonthRow, RunLogEntry};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unreachable: {0}")]
    Unreachable(String),

    #[error("store rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("store I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("store payload error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// Destination for projection output.
pub trait ProjectionStore {
    /// Human-readable backend name (for logging).
    fn name(&self) -> &str;

    /// Insert or replace the row keyed by `(row.year, row.month)`.
    fn upsert_month(&mut self, row: &ProjectedMonthRow) -> Result<(), StoreError>;

    /// Append one run log entry.
    fn insert_run_log(&mut self, entry: &RunLogEntry) -> Result<(), StoreError>;

    /// All stored rows for `year`, ordered by month.
    fn load_year(&self, year: i32) -> Result<Vec<ProjectedMonthRow>, StoreError>;
}
