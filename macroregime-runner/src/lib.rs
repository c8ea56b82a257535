//! macroregime runner: configuration, persistence and run orchestration.
//!
//! This crate builds on `macroregime-core` to provide:
//! - Credentials from the environment and an optional TOML run config
//! - Projection stores (PostgREST, local directory, in-memory)
//! - The staged run orchestrator with guaranteed failure logging
//! - Run summary and CSV exports

pub mod config;
pub mod export;
pub mod pipeline;
pub mod store;
pub mod summary;

pub use config::{ConfigError, Credentials, Requirements, RunConfig};
pub use export::{export_drivers_csv, export_projection_csv, write_exports};
pub use pipeline::{record_failure, RunContext, RunError, RunParams, RunReport, Stage};
pub use store::{LocalStore, MemoryStore, ProjectionStore, RestStore, StoreError};
pub use summary::{DriverRef, RunSummary};
