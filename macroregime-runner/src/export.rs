//! CSV exports of a finished run.
//!
//! - `projection.csv`: `year,month,score,regime,updated_at`
//! - `drivers.csv`: `key,name,z_raw,z_adj,weight,contribution,latest_value,latest_month`
//!
//! Undefined values are written as empty cells.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use macroregime_core::domain::{DriverRecord, ProjectedMonthRow};

use crate::pipeline::RunReport;

fn opt(v: Option<f64>) -> String {
    v.map(|x| x.to_string()).unwrap_or_default()
}

// ─── CSV export ─────────────────────────────────────────────────────

pub fn export_projection_csv(rows: &[ProjectedMonthRow]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["year", "month", "score", "regime", "updated_at"])?;

    for r in rows {
        wtr.write_record([
            r.year.to_string(),
            r.month.to_string(),
            r.score.to_string(),
            r.regime.as_str().to_string(),
            r.updated_at.to_rfc3339(),
        ])?;
    }

    let bytes = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}

pub fn export_drivers_csv(drivers: &[DriverRecord]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "key",
        "name",
        "z_raw",
        "z_adj",
        "weight",
        "contribution",
        "latest_value",
        "latest_month",
    ])?;

    for d in drivers {
        wtr.write_record([
            d.key.clone(),
            d.name.clone(),
            opt(d.z_raw),
            d.z_adj.to_string(),
            d.weight.to_string(),
            d.contribution.to_string(),
            opt(d.latest_value),
            d.latest_month.map(|m| m.to_string()).unwrap_or_default(),
        ])?;
    }

    let bytes = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}

// ─── File output ────────────────────────────────────────────────────

/// Write both CSVs into `dir` (created if missing). Returns the written paths.
pub fn write_exports(dir: &Path, report: &RunReport) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create export directory {}", dir.display()))?;

    let files = [
        ("projection.csv", export_projection_csv(&report.rows)?),
        ("drivers.csv", export_drivers_csv(&report.score.drivers)?),
    ];

    let mut written = Vec::with_capacity(files.len());
    for (name, content) in files {
        let path = dir.join(name);
        std::fs::write(&path, content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}
