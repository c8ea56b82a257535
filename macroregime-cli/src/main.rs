//! macroregime CLI: run the scoring pipeline and inspect its output.
//!
//! Commands:
//! - `run` — fetch, score, project and persist 12 months for the target year
//! - `indicators` — print the indicator table
//! - `show` — print projection rows stored in a local store directory
//!
//! Logs go to stderr (`RUST_LOG`, default `info`); stdout carries only command
//! output, so `run` prints exactly one JSON line on success.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Datelike, Utc};
use clap::{Parser, Subcommand};
use macroregime_core::data::{FetchError, FredProvider, InMemoryProvider, SeriesProvider};
use macroregime_core::domain::IndicatorTable;
use macroregime_core::projection::half_life;
use macroregime_runner::{
    record_failure, write_exports, Credentials, LocalStore, ProjectionStore, Requirements,
    RestStore, RunConfig, RunContext, RunParams,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "macroregime",
    about = "Macro regime score: composite of US macro indicators with a 12-month projection"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline and persist the projection.
    Run {
        /// Path to a TOML run config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Target year for the projected months. Overrides the config file.
        #[arg(long, value_parser = clap::value_parser!(i32).range(1900..=9999))]
        year: Option<i32>,

        /// Persist into a local directory instead of the REST store.
        #[arg(long)]
        local_store: Option<PathBuf>,

        /// Read series from a JSON snapshot instead of the FRED API.
        #[arg(long)]
        offline_fixture: Option<PathBuf>,

        /// Also write projection.csv and drivers.csv into this directory.
        #[arg(long)]
        csv_dir: Option<PathBuf>,
    },
    /// Print the indicator table.
    Indicators {
        /// Print as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print projection rows from a local store.
    Show {
        /// Local store directory.
        #[arg(long)]
        local_store: PathBuf,

        /// Year to show. Defaults to the current year.
        #[arg(long)]
        year: Option<i32>,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            year,
            local_store,
            offline_fixture,
            csv_dir,
        } => run_pipeline(config, year, local_store, offline_fixture, csv_dir),
        Commands::Indicators { json } => print_indicators(json),
        Commands::Show { local_store, year } => show_rows(local_store, year),
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run_pipeline(
    config_path: Option<PathBuf>,
    year: Option<i32>,
    local_store: Option<PathBuf>,
    offline_fixture: Option<PathBuf>,
    csv_dir: Option<PathBuf>,
) -> Result<()> {
    let config = match &config_path {
        Some(path) => RunConfig::from_file(path)?,
        None => RunConfig::default(),
    };

    // Credentials are checked before any network or storage access.
    let creds = Credentials::from_env(Requirements {
        api_key: offline_fixture.is_none(),
        store: local_store.is_none(),
    })?;

    // Without a store there is nowhere to log, so these are startup errors.
    let mut store: Box<dyn ProjectionStore> = match (&local_store, &creds.store) {
        (Some(dir), _) => Box::new(LocalStore::open(dir)?),
        (None, Some(store_creds)) => {
            Box::new(RestStore::new(store_creds, &config.store, config.timeout())?)
        }
        (None, None) => anyhow::bail!("no projection store configured"),
    };

    let provider = match build_provider(
        offline_fixture.as_deref(),
        creds.api_key.as_deref(),
        &config,
    ) {
        Ok(p) => p,
        Err(e) => {
            error!(error = %e, "could not set up series provider");
            record_failure(store.as_mut(), &e.to_string());
            return Err(e.into());
        }
    };

    let now = Utc::now();
    let params = RunParams {
        target_year: year.unwrap_or_else(|| config.target_year(now)),
        zscore_window: config.model.zscore_window,
        decay_k: config.decay_k(),
    };
    let table = IndicatorTable::us_default();

    let report = RunContext {
        provider: provider.as_ref(),
        store: store.as_mut(),
        table: &table,
        params,
    }
    .execute_at(now)?;

    if let Some(dir) = csv_dir {
        for path in write_exports(&dir, &report)? {
            info!(path = %path.display(), "exported");
        }
    }

    let line = serde_json::json!({
        "ok": true,
        "score_now": report.score_now(),
        "generated_at": report.summary.generated_at_utc,
    });
    println!("{line}");

    Ok(())
}

fn build_provider(
    offline_fixture: Option<&Path>,
    api_key: Option<&str>,
    config: &RunConfig,
) -> Result<Box<dyn SeriesProvider>, FetchError> {
    match (offline_fixture, api_key) {
        (Some(path), _) => Ok(Box::new(InMemoryProvider::from_json_file(path)?)),
        (None, Some(key)) => Ok(Box::new(
            FredProvider::new(key, config.timeout())?
                .with_base_url(config.fetch.base_url.clone()),
        )),
        (None, None) => Err(FetchError::Client("no series provider configured".into())),
    }
}

fn print_indicators(json: bool) -> Result<()> {
    let table = IndicatorTable::us_default();
    table.validate()?;

    if json {
        let out = serde_json::to_string_pretty(&table).context("failed to serialize table")?;
        println!("{out}");
        return Ok(());
    }

    println!("Series:");
    for s in &table.series {
        println!(
            "  {:<14} {:<22} {:?}, aggregate {:?}",
            s.id, s.name, s.frequency, s.aggregation
        );
    }

    println!();
    println!(
        "  {:<14} {:<26} {:<14} {:<14} {:<12} {:>6}",
        "Driver", "Name", "Source", "Transform", "Polarity", "Weight"
    );
    for d in &table.drivers {
        println!(
            "  {:<14} {:<26} {:<14} {:<14} {:<12} {:>6.2}",
            d.key,
            d.name,
            d.source,
            format!("{:?}", d.transform),
            format!("{:?}", d.polarity),
            d.weight
        );
    }
    println!("  total weight: {:.2}", table.total_weight());

    if let Some(benchmark) = &table.benchmark {
        println!();
        println!("Benchmark: {benchmark} (reported, not scored)");
    }

    let config = RunConfig::default();
    println!(
        "Projection: decay k = {:.2} (half-life {:.1} months), z-score window {} months",
        config.decay_k(),
        half_life(config.decay_k()),
        config.model.zscore_window
    );

    Ok(())
}

fn show_rows(dir: PathBuf, year: Option<i32>) -> Result<()> {
    let year = year.unwrap_or_else(|| Utc::now().year());
    let store = LocalStore::open_existing(&dir)?;
    let rows = store.load_year(year)?;

    if rows.is_empty() {
        println!("No projection rows for {year} in {}", dir.display());
        return Ok(());
    }

    println!("{:<8} {:>8}  {:<8} Updated", "Month", "Score", "Regime");
    for r in &rows {
        println!(
            "{}-{:02}  {:>8.4}  {:<8} {}",
            r.year,
            r.month,
            r.score,
            r.regime,
            r.updated_at.format("%Y-%m-%d %H:%M UTC")
        );
    }

    if let Some(first) = rows.first() {
        let mut drivers = first.drivers.clone();
        drivers.sort_by(|a, b| b.contribution.abs().total_cmp(&a.contribution.abs()));
        println!();
        println!("Drivers (by |contribution|):");
        for d in drivers {
            let z = d
                .z_raw
                .map(|z| format!("{z:+.2}"))
                .unwrap_or_else(|| "n/a".to_string());
            println!(
                "  {:<14} z {:>6}  contribution {:+.4}",
                d.key, z, d.contribution
            );
        }
    }

    Ok(())
}
