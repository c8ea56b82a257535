//! FRED data provider.
//!
//! Fetches the full observation history of a series from the
//! `series/observations` endpoint. One request per series, fixed timeout,
//! no retries: any failure aborts the run.
//!
//! FRED reports missing observations as the string `"."`; those become
//! missing values rather than being dropped.

use super::provider::{DataSource, FetchError, SeriesProvider};
use crate::domain::{Observation, ObservationSeries};
use chrono::NaiveDate;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.stlouisfed.org/fred";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    #[serde(default)]
    observations: Vec<RawObservation>,
}

#[derive(Debug, Deserialize)]
struct RawObservation {
    date: serde_json::Value,
    value: serde_json::Value,
}

/// Error body FRED returns with 4xx responses.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error_message: Option<String>,
}

pub struct FredProvider {
    client: reqwest::blocking::Client,
    api_key: String,
    base_url: String,
}

impl FredProvider {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn observations_url(&self) -> String {
        format!("{}/series/observations", self.base_url)
    }

    fn classify_status(series_id: &str, status: reqwest::StatusCode, body: &str) -> FetchError {
        let message = serde_json::from_str::<ErrorResponse>(body)
            .ok()
            .and_then(|e| e.error_message)
            .unwrap_or_else(|| body.chars().take(200).collect());

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return FetchError::AuthenticationRequired(message);
        }
        if status == reqwest::StatusCode::NOT_FOUND || message.contains("does not exist") {
            return FetchError::SeriesNotFound {
                series_id: series_id.to_string(),
            };
        }
        FetchError::HttpStatus {
            series_id: series_id.to_string(),
            status: status.as_u16(),
            message,
        }
    }
}

/// Parse an `observations` response body.
pub fn parse_observations(series_id: &str, body: &str) -> Result<ObservationSeries, FetchError> {
    let resp: ObservationsResponse = serde_json::from_str(body).map_err(|e| {
        FetchError::ResponseFormatChanged(format!("failed to parse response for {series_id}: {e}"))
    })?;

    let total = resp.observations.len();
    let observations: Vec<Observation> = resp
        .observations
        .into_iter()
        .filter_map(|raw| {
            parse_date(&raw.date).map(|date| Observation::new(date, parse_value(&raw.value)))
        })
        .collect();

    if observations.len() < total {
        debug!(
            series_id,
            dropped = total - observations.len(),
            "dropped observations with unparseable dates"
        );
    }

    Ok(ObservationSeries::new(observations))
}

fn parse_date(raw: &serde_json::Value) -> Option<NaiveDate> {
    let s = raw.as_str()?.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| s.get(..10).and_then(|p| NaiveDate::parse_from_str(p, "%Y-%m-%d").ok()))
}

fn parse_value(raw: &serde_json::Value) -> Option<f64> {
    let v = match raw {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    v.is_finite().then_some(v)
}

impl SeriesProvider for FredProvider {
    fn name(&self) -> &str {
        "fred"
    }

    fn source(&self) -> DataSource {
        DataSource::Fred
    }

    fn fetch(&self, series_id: &str) -> Result<ObservationSeries, FetchError> {
        let resp = self
            .client
            .get(self.observations_url())
            .query(&[
                ("series_id", series_id),
                ("api_key", self.api_key.as_str()),
                ("file_type", "json"),
            ])
            .send()
            .map_err(|e| {
                // Strip the URL: it carries the API key.
                let e = e.without_url();
                if e.is_timeout() {
                    FetchError::Timeout(e.to_string())
                } else {
                    FetchError::NetworkUnreachable(e.to_string())
                }
            })?;

        let status = resp.status();
        let body = resp
            .text()
            .map_err(|e| FetchError::NetworkUnreachable(e.without_url().to_string()))?;

        if !status.is_success() {
            return Err(Self::classify_status(series_id, status, &body));
        }

        parse_observations(series_id, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_sorts_observations() {
        let body = r#"{
            "realtime_start": "2024-06-01",
            "observations": [
                {"realtime_start": "2024-06-01", "date": "2024-02-01", "value": "3.9"},
                {"realtime_start": "2024-06-01", "date": "2024-01-01", "value": "3.7"},
                {"realtime_start": "2024-06-01", "date": "2024-03-01", "value": "."}
            ]
        }"#;
        let s = parse_observations("UNRATE", body).unwrap();
        assert_eq!(s.len(), 3);
        let obs = s.observations();
        assert_eq!(obs[0].date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(obs[0].value, Some(3.7));
        assert_eq!(obs[1].value, Some(3.9));
        assert_eq!(obs[2].value, None);
    }

    #[test]
    fn unparseable_dates_are_dropped() {
        let body = r#"{"observations": [
            {"date": "not-a-date", "value": "1.0"},
            {"date": "2024-01-05", "value": "2.0"},
            {"date": null, "value": "3.0"}
        ]}"#;
        let s = parse_observations("T10Y2Y", body).unwrap();
        assert_eq!(s.len(), 1);
        assert_eq!(s.values(), vec![2.0]);
    }

    #[test]
    fn numeric_json_values_accepted() {
        let body = r#"{"observations": [{"date": "2024-01-05", "value": 4.25}]}"#;
        let s = parse_observations("FEDFUNDS", body).unwrap();
        assert_eq!(s.values(), vec![4.25]);
    }

    #[test]
    fn missing_observations_key_is_empty() {
        let s = parse_observations("SP500", "{}").unwrap();
        assert!(s.is_empty());
    }

    #[test]
    fn malformed_body_is_format_error() {
        let err = parse_observations("SP500", "<html>").unwrap_err();
        assert!(matches!(err, FetchError::ResponseFormatChanged(_)));
    }

    #[test]
    fn bad_request_for_unknown_series() {
        let body =
            r#"{"error_code":400,"error_message":"Bad Request.  The series does not exist."}"#;
        let err = FredProvider::classify_status("NOPE", reqwest::StatusCode::BAD_REQUEST, body);
        assert!(matches!(err, FetchError::SeriesNotFound { .. }));
    }

    #[test]
    fn other_status_keeps_message() {
        let body = r#"{"error_code":500,"error_message":"Internal Server Error"}"#;
        let err = FredProvider::classify_status(
            "UNRATE",
            reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            body,
        );
        match err {
            FetchError::HttpStatus {
                status, message, ..
            } => {
                assert_eq!(status, 500);
                assert_eq!(message, "Internal Server Error");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn base_url_trailing_slash_trimmed() {
        let p = FredProvider::new("key", DEFAULT_TIMEOUT)
            .unwrap()
            .with_base_url("http://localhost:9000/fred/");
        assert_eq!(p.observations_url(), "http://localhost:9000/fred/series/observations");
        assert_eq!(p.source(), DataSource::Fred);
        assert_eq!(serde_json::to_value(p.source()).unwrap(), "fred");
    }
}
