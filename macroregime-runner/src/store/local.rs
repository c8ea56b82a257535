//! Filesystem store.
//!
//! Layout under the store directory:
//! ```text
//! monthly.json     all projected rows, ordered by (year, month)
//! run_log.jsonl    one run log entry per line, append-only
//! ```
//!
//! `monthly.json` is rewritten through a `.tmp` file and renamed into place,
//! so a crash mid-write leaves the previous contents intact.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use macroregime_core::domain::{ProjectedMonthRow, RunLogEntry};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{ProjectionStore, StoreError};

const MONTHLY_FILE: &str = "monthly.json";
const RUN_LOG_FILE: &str = "run_log.jsonl";

/// A run log line as written to `run_log.jsonl`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggedRun {
    pub logged_at: DateTime<Utc>,
    #[serde(flatten)]
    pub entry: RunLogEntry,
}

pub struct LocalStore {
    dir: PathBuf,
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl LocalStore {
    /// Open (creating if needed) a store rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(io_err(&dir))?;
        Ok(Self { dir })
    }

    /// Open an existing store without creating anything.
    pub fn open_existing(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        if !dir.is_dir() {
            let source = io::Error::new(io::ErrorKind::NotFound, "store directory not found");
            return Err(io_err(&dir)(source));
        }
        Ok(Self { dir })
    }

    fn monthly_path(&self) -> PathBuf {
        self.dir.join(MONTHLY_FILE)
    }

    fn log_path(&self) -> PathBuf {
        self.dir.join(RUN_LOG_FILE)
    }

    fn read_rows(&self) -> Result<BTreeMap<(i32, u32), ProjectedMonthRow>, StoreError> {
        let path = self.monthly_path();
        let json = match fs::read_to_string(&path) {
            Ok(s) => s,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(io_err(&path)(e)),
        };
        let rows: Vec<ProjectedMonthRow> = serde_json::from_str(&json)?;
        Ok(rows.into_iter().map(|r| (r.key(), r)).collect())
    }

    fn write_rows(&self, rows: &BTreeMap<(i32, u32), ProjectedMonthRow>) -> Result<(), StoreError> {
        let path = self.monthly_path();
        let tmp = path.with_extension("json.tmp");
        let rows: Vec<&ProjectedMonthRow> = rows.values().collect();
        let json = serde_json::to_string_pretty(&rows)?;
        fs::write(&tmp, json).map_err(io_err(&tmp))?;
        fs::rename(&tmp, &path).map_err(io_err(&path))?;
        Ok(())
    }

    /// Read every run log line. Malformed lines are skipped with a warning.
    pub fn read_log(&self) -> Result<Vec<LoggedRun>, StoreError> {
        let path = self.log_path();
        let file = match fs::File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_err(&path)(e)),
        };

        let mut entries = Vec::new();
        for (line_num, line) in io::BufReader::new(file).lines().enumerate() {
            let line = line.map_err(io_err(&path))?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<LoggedRun>(&line) {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!(line = line_num + 1, error = %e, "skipping malformed run log line"),
            }
        }
        Ok(entries)
    }
}

impl ProjectionStore for LocalStore {
    fn name(&self) -> &str {
        "local"
    }

    fn upsert_month(&mut self, row: &ProjectedMonthRow) -> Result<(), StoreError> {
        let mut rows = self.read_rows()?;
        rows.insert(row.key(), row.clone());
        self.write_rows(&rows)
    }

    fn insert_run_log(&mut self, entry: &RunLogEntry) -> Result<(), StoreError> {
        let line = serde_json::to_string(&LoggedRun {
            logged_at: Utc::now(),
            entry: entry.clone(),
        })?;

        let path = self.log_path();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(io_err(&path))?;
        writeln!(file, "{line}").map_err(io_err(&path))?;
        file.flush().map_err(io_err(&path))?;
        Ok(())
    }

    fn load_year(&self, year: i32) -> Result<Vec<ProjectedMonthRow>, StoreError> {
        Ok(self
            .read_rows()?
            .into_values()
            .filter(|r| r.year == year)
            .collect())
    }
}
