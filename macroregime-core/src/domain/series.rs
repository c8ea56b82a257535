//! Observation and monthly series.
//!
//! Missing values stay on the date axis as `None` so that resampling still sees
//! the month, while value-based statistics skip them.

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// One dated observation. `value` is `None` when the source reported a
/// non-numeric placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

impl Observation {
    pub fn new(date: NaiveDate, value: Option<f64>) -> Self {
        Self { date, value }
    }
}

/// First day of the month containing `date`.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}

/// `month` shifted back by `n` calendar months.
pub fn months_before(month: NaiveDate, n: u32) -> Option<NaiveDate> {
    month.checked_sub_months(Months::new(n))
}

/// Sort ascending, keep the last observation for repeated dates, and map
/// non-finite values to missing.
fn clean(mut obs: Vec<Observation>) -> Vec<Observation> {
    obs.sort_by_key(|o| o.date);
    let mut out: Vec<Observation> = Vec::with_capacity(obs.len());
    for mut o in obs {
        if o.value.is_some_and(|v| !v.is_finite()) {
            o.value = None;
        }
        match out.last_mut() {
            Some(prev) if prev.date == o.date => *prev = o,
            _ => out.push(o),
        }
    }
    out
}

/// Raw series as returned by a provider, strictly increasing by date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObservationSeries {
    observations: Vec<Observation>,
}

impl ObservationSeries {
    pub fn new(observations: Vec<Observation>) -> Self {
        Self {
            observations: clean(observations),
        }
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Non-missing values in date order.
    pub fn values(&self) -> Vec<f64> {
        self.observations.iter().filter_map(|o| o.value).collect()
    }
}

/// One value per populated calendar month, keyed by the month's first day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthlySeries {
    points: Vec<Observation>,
}

impl MonthlySeries {
    /// Build from points whose dates are snapped to month start. If two points
    /// fall in the same month the later one in input order wins.
    pub fn new(points: Vec<Observation>) -> Self {
        let snapped = points
            .into_iter()
            .map(|p| Observation::new(month_start(p.date), p.value))
            .collect();
        Self {
            points: clean(snapped),
        }
    }

    /// Consecutive months starting at `first_month`, all values present.
    pub fn from_values(first_month: NaiveDate, values: &[f64]) -> Self {
        let start = month_start(first_month);
        let points = values
            .iter()
            .enumerate()
            .filter_map(|(i, &v)| {
                start
                    .checked_add_months(Months::new(i as u32))
                    .map(|m| Observation::new(m, Some(v)))
            })
            .collect();
        Self::new(points)
    }

    pub fn points(&self) -> &[Observation] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Non-missing values in month order.
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().filter_map(|p| p.value).collect()
    }

    /// Value recorded for `month` (any date inside the month), if present.
    pub fn get(&self, month: NaiveDate) -> Option<f64> {
        let key = month_start(month);
        self.points
            .binary_search_by_key(&key, |p| p.date)
            .ok()
            .and_then(|i| self.points[i].value)
    }

    /// Latest non-missing value and its month.
    pub fn latest(&self) -> Option<(NaiveDate, f64)> {
        self.points
            .iter()
            .rev()
            .find_map(|p| p.value.map(|v| (p.date, v)))
    }

    /// Latest non-missing value minus the one before it; 0.0 with fewer than
    /// two values.
    pub fn last_change(&self) -> f64 {
        let mut present = self.points.iter().rev().filter_map(|p| p.value);
        match (present.next(), present.next()) {
            (Some(last), Some(prev)) => last - prev,
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn observation_series_sorts_and_dedupes() {
        let s = ObservationSeries::new(vec![
            Observation::new(d(2024, 1, 3), Some(3.0)),
            Observation::new(d(2024, 1, 1), Some(1.0)),
            Observation::new(d(2024, 1, 3), Some(4.0)),
            Observation::new(d(2024, 1, 2), None),
        ]);
        let dates: Vec<NaiveDate> = s.observations().iter().map(|o| o.date).collect();
        assert_eq!(dates, vec![d(2024, 1, 1), d(2024, 1, 2), d(2024, 1, 3)]);
        assert_eq!(s.observations()[2].value, Some(4.0));
        assert_eq!(s.values(), vec![1.0, 4.0]);
    }

    #[test]
    fn nan_values_become_missing() {
        let s = ObservationSeries::new(vec![Observation::new(d(2024, 1, 1), Some(f64::NAN))]);
        assert_eq!(s.len(), 1);
        assert_eq!(s.observations()[0].value, None);
    }

    #[test]
    fn monthly_from_values_is_consecutive() {
        let m = MonthlySeries::from_values(d(2023, 11, 15), &[1.0, 2.0, 3.0]);
        let months: Vec<NaiveDate> = m.points().iter().map(|p| p.date).collect();
        assert_eq!(months, vec![d(2023, 11, 1), d(2023, 12, 1), d(2024, 1, 1)]);
        assert_eq!(m.get(d(2023, 12, 20)), Some(2.0));
        assert_eq!(m.get(d(2024, 2, 1)), None);
    }

    #[test]
    fn latest_skips_missing_tail() {
        let m = MonthlySeries::new(vec![
            Observation::new(d(2024, 1, 1), Some(1.5)),
            Observation::new(d(2024, 2, 1), Some(2.0)),
            Observation::new(d(2024, 3, 1), None),
        ]);
        assert_eq!(m.latest(), Some((d(2024, 2, 1), 2.0)));
        assert!((m.last_change() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn last_change_needs_two_values() {
        let m = MonthlySeries::from_values(d(2024, 1, 1), &[7.0]);
        assert_eq!(m.last_change(), 0.0);
        assert_eq!(MonthlySeries::default().latest(), None);
    }

    #[test]
    fn months_before_crosses_year() {
        assert_eq!(months_before(d(2024, 1, 1), 12), Some(d(2023, 1, 1)));
        assert_eq!(months_before(d(2024, 3, 1), 3), Some(d(2023, 12, 1)));
    }
}
