//! In-memory provider backed by a fixed map of series.
//!
//! Used for tests and for replaying a saved snapshot (`--offline-fixture`).
//! The snapshot format is a JSON object mapping series id to an array of
//! `{"date": "YYYY-MM-DD", "value": number|null}`.

use std::collections::HashMap;
use std::path::Path;

use super::provider::{DataSource, FetchError, SeriesProvider};
use crate::domain::{Observation, ObservationSeries};

#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    series: HashMap<String, ObservationSeries>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_series(mut self, id: &str, series: ObservationSeries) -> Self {
        self.insert(id, series);
        self
    }

    pub fn insert(&mut self, id: &str, series: ObservationSeries) {
        self.series.insert(id.to_string(), series);
    }

    pub fn from_json_str(json: &str) -> Result<Self, FetchError> {
        let raw: HashMap<String, Vec<Observation>> = serde_json::from_str(json)
            .map_err(|e| FetchError::ResponseFormatChanged(format!("fixture: {e}")))?;
        Ok(Self {
            series: raw
                .into_iter()
                .map(|(id, obs)| (id, ObservationSeries::new(obs)))
                .collect(),
        })
    }

    pub fn from_json_file(path: &Path) -> Result<Self, FetchError> {
        let json = std::fs::read_to_string(path).map_err(|source| FetchError::FixtureIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }
}

impl SeriesProvider for InMemoryProvider {
    fn name(&self) -> &str {
        "in_memory"
    }

    fn source(&self) -> DataSource {
        DataSource::Fixture
    }

    fn fetch(&self, series_id: &str) -> Result<ObservationSeries, FetchError> {
        self.series
            .get(series_id)
            .cloned()
            .ok_or_else(|| FetchError::SeriesNotFound {
                series_id: series_id.to_string(),
            })
    }
}
