//! Frequency normalization to calendar months.

use chrono::NaiveDate;

use crate::domain::{month_start, Aggregation, MonthlySeries, Observation, ObservationSeries};

/// Collapse a series to one value per populated calendar month.
///
/// Buckets are keyed by the first day of the month. A month that has
/// observations but no numeric value is kept with a missing value; months with
/// no observations at all are not emitted.
pub fn to_monthly(series: &ObservationSeries, aggregation: Aggregation) -> MonthlySeries {
    let mut points: Vec<Observation> = Vec::new();
    let mut bucket: Option<NaiveDate> = None;
    let mut values: Vec<f64> = Vec::new();

    for obs in series.observations() {
        let month = month_start(obs.date);
        if bucket != Some(month) {
            if let Some(m) = bucket {
                points.push(Observation::new(m, aggregate(&values, aggregation)));
            }
            bucket = Some(month);
            values.clear();
        }
        if let Some(v) = obs.value {
            values.push(v);
        }
    }
    if let Some(m) = bucket {
        points.push(Observation::new(m, aggregate(&values, aggregation)));
    }

    MonthlySeries::new(points)
}

fn aggregate(values: &[f64], aggregation: Aggregation) -> Option<f64> {
    match aggregation {
        Aggregation::Last => values.last().copied(),
        Aggregation::Mean => {
            if values.is_empty() {
                None
            } else {
                Some(values.iter().sum::<f64>() / values.len() as f64)
            }
        }
    }
}
