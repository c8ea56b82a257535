//! Fetch orchestration: pull every series in the indicator table in order.

use std::collections::BTreeMap;

use tracing::info;

use super::provider::{FetchError, SeriesProvider};
use crate::domain::{IndicatorTable, ObservationSeries};

/// A fetch failure tagged with the series that caused it.
#[derive(Debug, thiserror::Error)]
#[error("fetching '{series_id}' from {provider}: {source}")]
pub struct SeriesFetchError {
    pub series_id: String,
    pub provider: String,
    #[source]
    pub source: FetchError,
}

/// Fetch every series in the table sequentially.
///
/// Stops at the first failure; nothing is returned for the remaining series.
pub fn fetch_all(
    provider: &dyn SeriesProvider,
    table: &IndicatorTable,
) -> Result<BTreeMap<String, ObservationSeries>, SeriesFetchError> {
    let total = table.series.len();
    let mut raw = BTreeMap::new();

    for (i, id) in table.series_ids().enumerate() {
        let series = provider.fetch(id).map_err(|source| SeriesFetchError {
            series_id: id.to_string(),
            provider: provider.name().to_string(),
            source,
        })?;
        info!(
            "[{}/{}] fetched {id}: {} observations",
            i + 1,
            total,
            series.len()
        );
        raw.insert(id.to_string(), series);
    }

    Ok(raw)
}
