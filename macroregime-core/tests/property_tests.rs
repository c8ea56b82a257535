//! Property tests for scoring invariants.
//!
//! Uses proptest to verify:
//! 1. Composite score stays in [−2, 2] for any values, weights and polarities
//! 2. z-scores are undefined below the history threshold
//! 3. Clamped driver z stays in [−3, 3]
//! 4. Regime labels agree with the thresholds
//! 5. Decay curves shrink monotonically toward zero
//! 6. Monthly resampling emits strictly increasing month starts

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use macroregime_core::domain::{
    Aggregation, IndicatorTable, MonthlySeries, Observation, ObservationSeries, Polarity, Regime,
};
use macroregime_core::projection::decay_curve;
use macroregime_core::scoring::{CompositeScorer, SCORE_LIMIT, Z_LIMIT};
use macroregime_core::transform::{clamp_or_neutral, min_history, to_monthly, zscore};
use proptest::prelude::*;

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_values(min: usize, max: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-1.0e6..1.0e6_f64, min..max)
}

fn arb_polarity() -> impl Strategy<Value = Polarity> {
    prop_oneof![Just(Polarity::Favorable), Just(Polarity::Unfavorable)]
}

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2000, 1, 1).unwrap()
}

// ── 1. Composite bound ───────────────────────────────────────────────

proptest! {
    #[test]
    fn composite_score_is_bounded(
        series in prop::collection::vec(arb_values(0, 160), 5),
        weights in prop::collection::vec(0.0..10.0_f64, 5),
        polarities in prop::collection::vec(arb_polarity(), 5),
    ) {
        let mut table = IndicatorTable::us_default();
        for (i, d) in table.drivers.iter_mut().enumerate() {
            d.weight = weights[i];
            d.polarity = polarities[i];
        }
        let inputs: BTreeMap<String, MonthlySeries> = table
            .drivers
            .iter()
            .zip(&series)
            .map(|(d, values)| (d.key.clone(), MonthlySeries::from_values(start(), values)))
            .collect();

        let score = CompositeScorer::new(&table).score(&inputs);
        prop_assert!(score.value.is_finite());
        prop_assert!((-SCORE_LIMIT..=SCORE_LIMIT).contains(&score.value));
        for d in &score.drivers {
            prop_assert!((-Z_LIMIT..=Z_LIMIT).contains(&d.z_adj));
            if d.z_raw.is_none() {
                prop_assert_eq!(d.contribution, 0.0);
            }
        }
    }
}

// ── 2. Insufficient history ──────────────────────────────────────────

proptest! {
    #[test]
    fn short_history_is_undefined(window in 1usize..400, values in arb_values(0, 200)) {
        let needed = min_history(window);
        let short: Vec<f64> = values.into_iter().take(needed - 1).collect();
        prop_assert_eq!(zscore(&short, window), None);
    }
}

// ── 3. Clamp ─────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn clamp_or_neutral_stays_in_bounds(x in prop::option::of(-1.0e9..1.0e9_f64)) {
        let v = clamp_or_neutral(x, -3.0, 3.0);
        prop_assert!((-3.0..=3.0).contains(&v));
        if x.is_none() {
            prop_assert_eq!(v, 0.0);
        }
    }
}

// ── 4. Regime thresholds ─────────────────────────────────────────────

proptest! {
    #[test]
    fn regime_matches_thresholds(score in -2.0..2.0_f64) {
        let expected = if score >= 0.5 {
            Regime::Bull
        } else if score <= -0.5 {
            Regime::Bear
        } else {
            Regime::Neutral
        };
        prop_assert_eq!(Regime::from_score(score), expected);
    }
}

// ── 5. Decay ─────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn decay_shrinks_toward_zero(
        score in -2.0..2.0_f64,
        k in 0.01..2.0_f64,
        horizon in 1usize..36,
    ) {
        let curve = decay_curve(score, horizon, k);
        prop_assert_eq!(curve.len(), horizon);
        prop_assert_eq!(curve[0], score);
        for w in curve.windows(2) {
            prop_assert!(w[1].abs() <= w[0].abs());
            prop_assert!(w[1] * score >= 0.0);
        }
    }
}

// ── 6. Resampling ────────────────────────────────────────────────────

proptest! {
    #[test]
    fn monthly_buckets_strictly_increase(
        offsets in prop::collection::vec(0i64..2000, 0..300),
        mean in any::<bool>(),
    ) {
        let obs: Vec<Observation> = offsets
            .iter()
            .map(|&o| Observation::new(start() + chrono::Duration::days(o), Some(o as f64)))
            .collect();
        let series = ObservationSeries::new(obs);
        let agg = if mean { Aggregation::Mean } else { Aggregation::Last };
        let monthly = to_monthly(&series, agg);

        let mut distinct: Vec<(i32, u32)> = series
            .observations()
            .iter()
            .map(|o| (o.date.year(), o.date.month()))
            .collect();
        distinct.dedup();
        prop_assert_eq!(monthly.len(), distinct.len());
        for w in monthly.points().windows(2) {
            prop_assert!(w[0].date < w[1].date);
        }
        for p in monthly.points() {
            prop_assert_eq!(p.date.day(), 1);
        }
    }
}
