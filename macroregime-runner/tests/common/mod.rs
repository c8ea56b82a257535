//! Deterministic raw series for the default US indicator table.

#![allow(dead_code)]

use chrono::{DateTime, Months, NaiveDate, TimeZone, Utc};
use macroregime_core::data::{InMemoryProvider, SeriesProvider};
use macroregime_core::domain::{Observation, ObservationSeries};

/// 2008-01 through 2025-12.
pub const MONTHS: usize = 216;

pub fn first_month() -> NaiveDate {
    NaiveDate::from_ymd_opt(2008, 1, 1).unwrap()
}

pub fn last_month() -> NaiveDate {
    month(MONTHS - 1)
}

pub fn month(i: usize) -> NaiveDate {
    first_month()
        .checked_add_months(Months::new(i as u32))
        .unwrap()
}

pub fn generated_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap()
}

pub fn monthly(f: impl Fn(usize) -> f64) -> ObservationSeries {
    ObservationSeries::new(
        (0..MONTHS)
            .map(|i| Observation::new(month(i), Some(f(i))))
            .collect(),
    )
}

/// Three observations per month, on days 1, 10 and 20.
pub fn daily(f: impl Fn(usize, u32) -> f64) -> ObservationSeries {
    let mut obs = Vec::new();
    for i in 0..MONTHS {
        for day in [1, 10, 20] {
            let date = NaiveDate::from_ymd_opt(2008, 1, day)
                .unwrap()
                .checked_add_months(Months::new(i as u32))
                .unwrap();
            obs.push(Observation::new(date, Some(f(i, day))));
        }
    }
    ObservationSeries::new(obs)
}

pub fn unrate(i: usize) -> f64 {
    5.0 + (i as f64 * 0.3).sin()
}

pub fn sp500(i: usize, day: u32) -> f64 {
    1000.0 + i as f64 * 10.0 + day as f64
}

/// Every series the default table fetches.
pub fn full_provider() -> InMemoryProvider {
    InMemoryProvider::new()
        .with_series(
            "CPIAUCSL",
            monthly(|i| 100.0 * 1.0025f64.powi(i as i32) * (1.0 + 0.02 * (i as f64 * 0.05).sin())),
        )
        .with_series("UNRATE", monthly(unrate))
        .with_series("FEDFUNDS", monthly(|i| 2.0 + (i as f64 * 0.2).cos()))
        .with_series(
            "T10Y2Y",
            daily(|i, day| 1.0 + (i as f64 * 0.15).sin() + day as f64 * 0.001),
        )
        .with_series(
            "BAMLH0A0HYM2",
            daily(|i, day| 4.0 + (i as f64 * 0.1).cos() - day as f64 * 0.002),
        )
        .with_series("SP500", daily(sp500))
}

/// The full set minus `missing`.
pub fn provider_without(missing: &str) -> InMemoryProvider {
    let mut p = InMemoryProvider::new();
    let full = full_provider();
    for id in ["CPIAUCSL", "UNRATE", "FEDFUNDS", "T10Y2Y", "BAMLH0A0HYM2", "SP500"] {
        if id != missing {
            p.insert(id, full.fetch(id).unwrap());
        }
    }
    p
}
