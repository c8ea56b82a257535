//! In-memory store for tests and dry runs.

use std::collections::BTreeMap;

use macroregime_core::domain::{ProjectedMonthRow, RunLogEntry};

use super::{ProjectionStore, StoreError};

/// Rows keyed by `(year, month)` plus the ordered run log.
///
/// `fail_upserts_from` makes every upsert of a month `>= n` fail, so tests can
/// exercise partial-write behavior.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: BTreeMap<(i32, u32), ProjectedMonthRow>,
    log: Vec<RunLogEntry>,
    fail_upserts_from: Option<u32>,
    fail_log: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_upserts_from(mut self, month: u32) -> Self {
        self.fail_upserts_from = Some(month);
        self
    }

    pub fn failing_log(mut self) -> Self {
        self.fail_log = true;
        self
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn log(&self) -> &[RunLogEntry] {
        &self.log
    }
}

impl ProjectionStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn upsert_month(&mut self, row: &ProjectedMonthRow) -> Result<(), StoreError> {
        if self.fail_upserts_from.is_some_and(|m| row.month >= m) {
            return Err(StoreError::Unreachable(format!(
                "injected failure at {}-{:02}",
                row.year, row.month
            )));
        }
        self.rows.insert(row.key(), row.clone());
        Ok(())
    }

    fn insert_run_log(&mut self, entry: &RunLogEntry) -> Result<(), StoreError> {
        if self.fail_log {
            return Err(StoreError::Unreachable("injected log failure".into()));
        }
        self.log.push(entry.clone());
        Ok(())
    }

    fn load_year(&self, year: i32) -> Result<Vec<ProjectedMonthRow>, StoreError> {
        Ok(self
            .rows
            .range((year, 0)..=(year, u32::MAX))
            .map(|(_, r)| r.clone())
            .collect())
    }
}
