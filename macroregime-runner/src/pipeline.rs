//! Run orchestrator.
//!
//! `Validate -> Fetch -> Normalize -> Score -> Project -> PersistRows -> LogSuccess`
//!
//! Every failure is handled in one place: `RunContext::execute` writes an error
//! run log entry (empty summary, error text) and returns the original error.
//! A failure to write that entry is logged and never replaces the original.
//! Callers that fail while building the provider use `record_failure` so those
//! errors reach the run log too.

use std::fmt;

use chrono::{DateTime, Utc};
use macroregime_core::data::{fetch_all, SeriesFetchError, SeriesProvider};
use macroregime_core::domain::{IndicatorTable, ProjectedMonthRow, RunLogEntry, TableError};
use macroregime_core::fingerprint::DatasetHash;
use macroregime_core::projection::{project, DEFAULT_DECAY_K, DEFAULT_HORIZON};
use macroregime_core::scoring::{CompositeScore, CompositeScorer};
use macroregime_core::transform::{driver_inputs, normalize_sources, DEFAULT_WINDOW};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::store::{ProjectionStore, StoreError};
use crate::summary::{self, RunSummary};

/// Number of projected months persisted per target year.
pub const MONTHS_PER_YEAR: usize = DEFAULT_HORIZON;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Validate,
    Fetch,
    Normalize,
    Score,
    Project,
    PersistRows,
    LogSuccess,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Validate => "validate",
            Stage::Fetch => "fetch",
            Stage::Normalize => "normalize",
            Stage::Score => "score",
            Stage::Project => "project",
            Stage::PersistRows => "persist_rows",
            Stage::LogSuccess => "log_success",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error("invalid indicator table: {0}")]
    Table(#[from] TableError),

    #[error(transparent)]
    Fetch(#[from] SeriesFetchError),

    #[error("persisting {year}-{month:02}: {source}")]
    Persist {
        year: i32,
        month: u32,
        #[source]
        source: StoreError,
    },

    #[error("writing run log: {0}")]
    LogSuccess(#[source] StoreError),

    #[error("serializing run summary: {0}")]
    Summary(#[from] serde_json::Error),
}

impl RunError {
    pub fn stage(&self) -> Stage {
        match self {
            RunError::Table(_) => Stage::Validate,
            RunError::Fetch(_) => Stage::Fetch,
            RunError::Persist { .. } => Stage::PersistRows,
            RunError::LogSuccess(_) | RunError::Summary(_) => Stage::LogSuccess,
        }
    }
}

/// Tunables for one run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunParams {
    pub target_year: i32,
    pub zscore_window: usize,
    pub decay_k: f64,
}

impl RunParams {
    pub fn new(target_year: i32) -> Self {
        Self {
            target_year,
            zscore_window: DEFAULT_WINDOW,
            decay_k: DEFAULT_DECAY_K,
        }
    }
}

/// Everything a run needs, built once by the caller and passed explicitly.
pub struct RunContext<'a> {
    pub provider: &'a dyn SeriesProvider,
    pub store: &'a mut dyn ProjectionStore,
    pub table: &'a IndicatorTable,
    pub params: RunParams,
}

/// Output of a successful run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub score: CompositeScore,
    pub rows: Vec<ProjectedMonthRow>,
    pub summary: RunSummary,
}

impl RunReport {
    pub fn score_now(&self) -> f64 {
        self.score.value
    }
}

impl<'a> RunContext<'a> {
    pub fn execute(&mut self) -> Result<RunReport, RunError> {
        self.execute_at(Utc::now())
    }

    /// Run the pipeline with `generated_at` stamped on every row and the
    /// summary.
    pub fn execute_at(&mut self, generated_at: DateTime<Utc>) -> Result<RunReport, RunError> {
        info!(
            provider = self.provider.name(),
            source = ?self.provider.source(),
            store = self.store.name(),
            target_year = self.params.target_year,
            "starting run"
        );

        match self.run_stages(generated_at) {
            Ok(report) => {
                info!(score_now = report.score_now(), "run finished");
                Ok(report)
            }
            Err(e) => {
                error!(stage = %e.stage(), error = %e, "run failed");
                record_failure(&mut *self.store, &e.to_string());
                Err(e)
            }
        }
    }

    fn run_stages(&mut self, generated_at: DateTime<Utc>) -> Result<RunReport, RunError> {
        let table = self.table;
        let params = self.params;

        table.validate()?;

        let raw = fetch_all(self.provider, table)?;

        let monthly = normalize_sources(table, &raw);
        let inputs = driver_inputs(table, &monthly);
        info!(
            stage = %Stage::Normalize,
            series = monthly.len(),
            drivers = inputs.len(),
            "normalized"
        );

        let score = CompositeScorer::new(table)
            .with_window(params.zscore_window)
            .score(&inputs);
        let dataset_hash = DatasetHash::of_inputs(&inputs);
        info!(
            stage = %Stage::Score,
            score_now = score.value,
            defined = score.defined_drivers(),
            dataset_hash = %dataset_hash,
            "scored"
        );

        let rows = projected_rows(&score, params, generated_at);
        info!(stage = %Stage::Project, months = rows.len(), "projected");

        for row in &rows {
            self.store
                .upsert_month(row)
                .map_err(|source| RunError::Persist {
                    year: row.year,
                    month: row.month,
                    source,
                })?;
        }
        info!(stage = %Stage::PersistRows, store = self.store.name(), "rows persisted");

        let (worst, best) = summary::extremes(&score.drivers).unzip();
        let benchmark = table.benchmark.as_deref();
        let (benchmark_latest, benchmark_month) =
            summary::benchmark_latest(benchmark.and_then(|id| monthly.get(id)));
        let run_summary = RunSummary {
            score_now: score.value,
            source: self.provider.source(),
            best_driver: best,
            worst_driver: worst,
            benchmark_id: benchmark.map(str::to_string),
            benchmark_latest,
            benchmark_month,
            generated_at_utc: generated_at,
            target_year: params.target_year,
            decay_k: params.decay_k,
            dataset_hash: dataset_hash.0,
            delta_proxy: summary::delta_proxy(&score.drivers),
        };

        let entry = RunLogEntry::success(serde_json::to_value(&run_summary)?);
        self.store
            .insert_run_log(&entry)
            .map_err(RunError::LogSuccess)?;

        Ok(RunReport {
            score,
            rows,
            summary: run_summary,
        })
    }
}

/// Append an error run log entry. A failure to write it is only logged.
pub fn record_failure(store: &mut dyn ProjectionStore, message: &str) {
    if let Err(log_err) = store.insert_run_log(&RunLogEntry::failure(message)) {
        warn!(error = %log_err, "could not record failed run");
    }
}

/// Twelve rows for the target year; every row carries the same driver
/// snapshot.
pub fn projected_rows(
    score: &CompositeScore,
    params: RunParams,
    generated_at: DateTime<Utc>,
) -> Vec<ProjectedMonthRow> {
    project(score.value, MONTHS_PER_YEAR, params.decay_k)
        .into_iter()
        .map(|p| ProjectedMonthRow {
            year: params.target_year,
            month: p.step as u32,
            score: p.score,
            regime: p.regime,
            drivers: score.drivers.clone(),
            updated_at: generated_at,
        })
        .collect()
}
