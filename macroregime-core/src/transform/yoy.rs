//! Year-over-year change from a monthly level series.

use crate::domain::{months_before, MonthlySeries, Observation};

/// `(v[m] / v[m-12] - 1) * 100` for every month whose value twelve calendar
/// months earlier exists.
///
/// Months without that predecessor are dropped, as are months where either
/// value is missing or the base is zero. Gaps are never interpolated.
pub fn yoy_from_level(monthly: &MonthlySeries) -> MonthlySeries {
    let points = monthly
        .points()
        .iter()
        .filter_map(|p| {
            let current = p.value?;
            let base = monthly.get(months_before(p.date, 12)?)?;
            if base == 0.0 {
                return None;
            }
            Some(Observation::new(p.date, Some((current / base - 1.0) * 100.0)))
        })
        .collect();

    MonthlySeries::new(points)
}
