//! PostgREST-compatible store (Supabase).
//!
//! Rows are upserted with `on_conflict=anio,mes` and
//! `Prefer: resolution=merge-duplicates`; run log entries are plain inserts.
//! Every request carries the service key as both `apikey` and bearer token.

use std::time::Duration;

use macroregime_core::domain::{ProjectedMonthRow, RunLogEntry};
use reqwest::blocking::{Client, RequestBuilder, Response};
use tracing::debug;

use super::{ProjectionStore, StoreError};
use crate::config::{StoreCredentials, StoreSection};

pub struct RestStore {
    client: Client,
    base_url: String,
    key: String,
    monthly_table: String,
    run_log_table: String,
}

impl RestStore {
    pub fn new(
        creds: &StoreCredentials,
        tables: &StoreSection,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: creds.url.trim_end_matches('/').to_string(),
            key: creds.key.clone(),
            monthly_table: tables.monthly_table.clone(),
            run_log_table: tables.run_log_table.clone(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        req.header("apikey", &self.key).bearer_auth(&self.key)
    }

    fn send(req: RequestBuilder) -> Result<Response, StoreError> {
        let resp = req
            .send()
            .map_err(|e| StoreError::Unreachable(e.without_url().to_string()))?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let message: String = resp
            .text()
            .unwrap_or_default()
            .chars()
            .take(300)
            .collect();
        Err(StoreError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

impl ProjectionStore for RestStore {
    fn name(&self) -> &str {
        "rest"
    }

    fn upsert_month(&mut self, row: &ProjectedMonthRow) -> Result<(), StoreError> {
        debug!(table = %self.monthly_table, year = row.year, month = row.month, "upsert");
        let req = self
            .client
            .post(self.table_url(&self.monthly_table))
            .query(&[("on_conflict", "anio,mes")])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(row);
        Self::send(self.authorized(req))?;
        Ok(())
    }

    fn insert_run_log(&mut self, entry: &RunLogEntry) -> Result<(), StoreError> {
        debug!(table = %self.run_log_table, status = ?entry.status, "insert run log");
        let req = self
            .client
            .post(self.table_url(&self.run_log_table))
            .header("Prefer", "return=minimal")
            .json(entry);
        Self::send(self.authorized(req))?;
        Ok(())
    }

    fn load_year(&self, year: i32) -> Result<Vec<ProjectedMonthRow>, StoreError> {
        let req = self
            .client
            .get(self.table_url(&self.monthly_table))
            .query(&[
                ("select", "*".to_string()),
                ("anio", format!("eq.{year}")),
                ("order", "mes.asc".to_string()),
            ]);
        let body = Self::send(self.authorized(req))?
            .text()
            .map_err(|e| StoreError::Unreachable(e.without_url().to_string()))?;
        Ok(serde_json::from_str(&body)?)
    }
}
