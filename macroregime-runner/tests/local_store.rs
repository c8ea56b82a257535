//! Filesystem store: idempotent upserts, append-only run log, full runs.

mod common;

use std::collections::BTreeMap;
use std::io::Write;

use macroregime_core::domain::{IndicatorTable, ProjectedMonthRow, Regime, RunLogEntry, RunStatus};
use macroregime_runner::{LocalStore, ProjectionStore, RunContext, RunParams};
use proptest::prelude::*;

fn row(month: u32, score: f64) -> ProjectedMonthRow {
    ProjectedMonthRow {
        year: 2026,
        month,
        score,
        regime: Regime::from_score(score),
        drivers: vec![],
        updated_at: common::generated_at(),
    }
}

#[test]
fn empty_store_loads_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::open(dir.path().join("store")).unwrap();
    assert!(store.load_year(2026).unwrap().is_empty());
    assert!(store.read_log().unwrap().is_empty());
}

#[test]
fn open_existing_does_not_create_directory() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nowhere");
    assert!(LocalStore::open_existing(&missing).is_err());
    assert!(!missing.exists());

    LocalStore::open(&missing).unwrap();
    let store = LocalStore::open_existing(&missing).unwrap();
    assert!(store.load_year(2026).unwrap().is_empty());
}

#[test]
fn upsert_replaces_row_and_leaves_no_temp_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = LocalStore::open(dir.path()).unwrap();

    store.upsert_month(&row(1, 0.2)).unwrap();
    store.upsert_month(&row(2, 0.1)).unwrap();
    store.upsert_month(&row(1, -0.9)).unwrap();

    let rows = store.load_year(2026).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].month, 1);
    assert_eq!(rows[0].score, -0.9);
    assert_eq!(rows[0].regime, Regime::Bear);

    let leftovers: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn monthly_file_uses_store_column_names() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = LocalStore::open(dir.path()).unwrap();
    store.upsert_month(&row(3, 0.6)).unwrap();

    let json = std::fs::read_to_string(dir.path().join("monthly.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value[0]["anio"], 2026);
    assert_eq!(value[0]["mes"], 3);
    assert_eq!(value[0]["regime"], "bull");
}

#[test]
fn run_log_appends_and_skips_malformed_lines() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = LocalStore::open(dir.path()).unwrap();

    store
        .insert_run_log(&RunLogEntry::success(serde_json::json!({"score_now": 0.4})))
        .unwrap();
    {
        let mut f = std::fs::OpenOptions::new()
            .append(true)
            .open(dir.path().join("run_log.jsonl"))
            .unwrap();
        writeln!(f, "{{not json").unwrap();
    }
    store
        .insert_run_log(&RunLogEntry::failure("timed out"))
        .unwrap();

    let log = store.read_log().unwrap();
    assert_eq!(log.len(), 2);
    assert_eq!(log[0].entry.status, RunStatus::Success);
    assert_eq!(log[0].entry.summary["score_now"], 0.4);
    assert_eq!(log[1].entry.status, RunStatus::Error);
    assert_eq!(log[1].entry.error.as_deref(), Some("timed out"));
    assert!(log[0].logged_at <= log[1].logged_at);
}

#[test]
fn repeated_runs_keep_twelve_rows() {
    let dir = tempfile::tempdir().unwrap();
    let provider = common::full_provider();
    let table = IndicatorTable::us_default();
    let mut store = LocalStore::open(dir.path()).unwrap();

    let mut scores = Vec::new();
    for _ in 0..2 {
        let report = RunContext {
            provider: &provider,
            store: &mut store,
            table: &table,
            params: RunParams::new(2026),
        }
        .execute_at(common::generated_at())
        .unwrap();
        scores.push(report.score_now());
    }
    assert_eq!(scores[0], scores[1]);

    // Reopen to read from disk only.
    let store = LocalStore::open(dir.path()).unwrap();
    let rows = store.load_year(2026).unwrap();
    assert_eq!(rows.len(), 12);
    assert!((rows[0].score - scores[0]).abs() < 1e-12);
    assert!(store.load_year(2025).unwrap().is_empty());

    let log = store.read_log().unwrap();
    assert_eq!(log.len(), 2);
    assert_eq!(
        log[0].entry.summary["dataset_hash"],
        log[1].entry.summary["dataset_hash"]
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn last_write_wins_per_month(
        writes in prop::collection::vec((1u32..=12, -2.0..2.0_f64), 1..30),
    ) {
        let dir = tempfile::tempdir().unwrap();
        let mut store = LocalStore::open(dir.path()).unwrap();
        let mut expected = BTreeMap::new();
        for (month, score) in &writes {
            store.upsert_month(&row(*month, *score)).unwrap();
            expected.insert(*month, *score);
        }

        let rows = store.load_year(2026).unwrap();
        prop_assert_eq!(rows.len(), expected.len());
        for r in rows {
            let want = expected[&r.month];
            prop_assert!(
                (r.score - want).abs() < 1e-12,
                "month {}: {} vs {}",
                r.month,
                r.score,
                want
            );
        }
    }
}
