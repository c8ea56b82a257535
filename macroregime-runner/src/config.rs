//! Run configuration: credentials from the environment, tunables from TOML.
//!
//! Credentials are checked before any network or storage access. The TOML
//! file is optional; every field has a default.
//!
//! ```toml
//! [run]
//! target_year = 2026
//!
//! [model]
//! zscore_window = 120
//! decay_k = 0.22            # or: half_life_months = 3.15
//!
//! [fetch]
//! base_url = "https://api.stlouisfed.org/fred"
//! timeout_secs = 30
//!
//! [store]
//! monthly_table = "macro_regime_monthly_us"
//! run_log_table = "macro_regime_run_log"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Datelike, Utc};
use macroregime_core::data::fred::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use macroregime_core::projection::{decay_from_half_life, DEFAULT_DECAY_K};
use macroregime_core::transform::DEFAULT_WINDOW;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

pub const ENV_API_KEY: &str = "FRED_API_KEY";
pub const ENV_STORE_URL: &str = "SUPABASE_URL";
pub const ENV_STORE_KEY: &str = "SUPABASE_KEY";

pub const DEFAULT_MONTHLY_TABLE: &str = "macro_regime_monthly_us";
pub const DEFAULT_RUN_LOG_TABLE: &str = "macro_regime_run_log";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variables: {}", .0.join(", "))]
    MissingEnv(Vec<&'static str>),

    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Which credentials the selected backends need.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requirements {
    pub api_key: bool,
    pub store: bool,
}

impl Requirements {
    pub const ALL: Requirements = Requirements {
        api_key: true,
        store: true,
    };
}

#[derive(Clone, PartialEq, Eq)]
pub struct StoreCredentials {
    pub url: String,
    pub key: String,
}

/// Secrets read from the environment. Never logged.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Credentials {
    pub api_key: Option<String>,
    pub store: Option<StoreCredentials>,
}

/// A `.env` load error worth reporting. A missing file is not one.
fn env_file_problem<T>(result: dotenvy::Result<T>) -> Option<dotenvy::Error> {
    match result {
        Ok(_) => None,
        Err(e) if e.not_found() => None,
        Err(e) => Some(e),
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("store_url", &self.store.as_ref().map(|s| s.url.as_str()))
            .finish()
    }
}

impl Credentials {
    /// Load `.env` (if present) and read credentials from the process
    /// environment.
    pub fn from_env(req: Requirements) -> Result<Self, ConfigError> {
        if let Some(e) = env_file_problem(dotenvy::dotenv()) {
            warn!(error = %e, "ignoring unreadable .env file");
        }
        Self::from_lookup(req, |name| std::env::var(name).ok())
    }

    /// Read credentials through `lookup`. Empty values count as missing.
    /// All missing required names are reported together.
    pub fn from_lookup(
        req: Requirements,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key = get(ENV_API_KEY);
        let url = get(ENV_STORE_URL);
        let key = get(ENV_STORE_KEY);

        let mut missing = Vec::new();
        if req.api_key && api_key.is_none() {
            missing.push(ENV_API_KEY);
        }
        if req.store {
            if url.is_none() {
                missing.push(ENV_STORE_URL);
            }
            if key.is_none() {
                missing.push(ENV_STORE_KEY);
            }
        }
        if !missing.is_empty() {
            return Err(ConfigError::MissingEnv(missing));
        }

        let store = match (url, key) {
            (Some(url), Some(key)) => Some(StoreCredentials { url, key }),
            _ => None,
        };
        Ok(Self { api_key, store })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunSection {
    /// Calendar year the 12 projected months are written for. Defaults to the
    /// current UTC year.
    pub target_year: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelSection {
    pub zscore_window: usize,
    pub decay_k: Option<f64>,
    pub half_life_months: Option<f64>,
}

impl Default for ModelSection {
    fn default() -> Self {
        Self {
            zscore_window: DEFAULT_WINDOW,
            decay_k: None,
            half_life_months: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FetchSection {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for FetchSection {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreSection {
    pub monthly_table: String,
    pub run_log_table: String,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            monthly_table: DEFAULT_MONTHLY_TABLE.to_string(),
            run_log_table: DEFAULT_RUN_LOG_TABLE.to_string(),
        }
    }
}

/// Tunables loaded from the optional TOML file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub run: RunSection,
    pub model: ModelSection,
    pub fetch: FetchSection,
    pub store: StoreSection,
}

impl RunConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: RunConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model.zscore_window == 0 {
            return Err(ConfigError::Invalid("model.zscore_window must be > 0".into()));
        }
        match (self.model.decay_k, self.model.half_life_months) {
            (Some(_), Some(_)) => {
                return Err(ConfigError::Invalid(
                    "set either model.decay_k or model.half_life_months, not both".into(),
                ))
            }
            (Some(k), None) if !k.is_finite() || k < 0.0 => {
                return Err(ConfigError::Invalid(format!(
                    "model.decay_k must be finite and >= 0, got {k}"
                )))
            }
            (None, Some(h)) if !h.is_finite() || h <= 0.0 => {
                return Err(ConfigError::Invalid(format!(
                    "model.half_life_months must be finite and > 0, got {h}"
                )))
            }
            _ => {}
        }
        if let Some(year) = self.run.target_year {
            if !(1900..=9999).contains(&year) {
                return Err(ConfigError::Invalid(format!(
                    "run.target_year out of range: {year}"
                )));
            }
        }
        if self.fetch.timeout_secs == 0 {
            return Err(ConfigError::Invalid("fetch.timeout_secs must be > 0".into()));
        }
        if self.store.monthly_table.trim().is_empty() || self.store.run_log_table.trim().is_empty()
        {
            return Err(ConfigError::Invalid("store table names must not be empty".into()));
        }
        Ok(())
    }

    /// Decay rate, resolved from `decay_k` or `half_life_months`.
    pub fn decay_k(&self) -> f64 {
        match (self.model.decay_k, self.model.half_life_months) {
            (Some(k), _) => k,
            (None, Some(h)) => decay_from_half_life(h),
            (None, None) => DEFAULT_DECAY_K,
        }
    }

    pub fn target_year(&self, now: DateTime<Utc>) -> i32 {
        self.run.target_year.unwrap_or_else(|| now.year())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.fetch.timeout_secs)
    }
}
