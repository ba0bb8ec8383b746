//! Tap configuration
//!
//! The config file is the JSON object handed to the tap with `--config`.
//! Required keys are checked up front so that every missing key is
//! reported in a single error.

use crate::error::{Error, Result, ResultExt};
use crate::types::{parse_timestamp, JsonValue};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Keys that must be present in every config file
pub const REQUIRED_CONFIG_KEYS: &[&str] = &["api_token", "query", "start_date"];

/// Default Opsgenie API root
pub const DEFAULT_API_URL: &str = "https://api.opsgenie.com/v2";

// ============================================================================
// Tap Config
// ============================================================================

/// Configuration for a tap run
#[derive(Clone, Serialize, Deserialize)]
pub struct TapConfig {
    /// Opsgenie API integration key, sent as `GenieKey <token>`
    pub api_token: String,

    /// Base URL for API requests
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Free-text alert filter, combined with the `updatedAt` lower bound
    pub query: String,

    /// Fallback bookmark when the state has none
    pub start_date: String,

    /// Optional User-Agent header value
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Attempts per request, including the first one
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base of the exponential backoff, in seconds
    #[serde(default = "default_backoff_factor")]
    pub backoff_factor: f64,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_max_retries() -> u32 {
    5
}

fn default_backoff_factor() -> f64 {
    2.0
}

impl TapConfig {
    /// Load config from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_json(&contents)
    }

    /// Load config from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let value: JsonValue = serde_json::from_str(json)
            .map_err(|e| Error::config(format!("Invalid config JSON: {e}")))?;
        Self::from_value(value)
    }

    /// Build config from an already parsed JSON value
    pub fn from_value(value: JsonValue) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| Error::config("Config must be a JSON object"))?;

        let missing: Vec<&str> = REQUIRED_CONFIG_KEYS
            .iter()
            .copied()
            .filter(|key| !object.contains_key(*key))
            .collect();
        if !missing.is_empty() {
            return Err(Error::missing_fields(missing));
        }

        let config: TapConfig = serde_json::from_value(value)
            .map_err(|e| Error::config(format!("Invalid config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that deserialize fine but cannot be used
    pub fn validate(&self) -> Result<()> {
        if self.api_token.trim().is_empty() {
            return Err(Error::invalid_value("api_token", "must not be empty"));
        }
        url::Url::parse(&self.api_url)
            .map_err(|e| Error::invalid_value("api_url", e.to_string()))?;
        parse_timestamp(&self.start_date)
            .map_err(|e| Error::invalid_value("start_date", e.to_string()))?;
        if self.max_retries == 0 {
            return Err(Error::invalid_value("max_retries", "must be at least 1"));
        }
        Duration::try_from_secs_f64(self.backoff_factor)
            .map_err(|e| Error::invalid_value("backoff_factor", e.to_string()))?;
        Ok(())
    }

    /// URL of the alerts listing endpoint
    pub fn alerts_url(&self) -> String {
        format!("{}/alerts", self.api_url.trim_end_matches('/'))
    }

    /// Backoff base as a duration, zero when the factor is out of range
    pub fn backoff(&self) -> Duration {
        Duration::try_from_secs_f64(self.backoff_factor).unwrap_or_default()
    }
}

impl std::fmt::Debug for TapConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TapConfig")
            .field("api_token", &"***")
            .field("api_url", &self.api_url)
            .field("query", &self.query)
            .field("start_date", &self.start_date)
            .field("user_agent", &self.user_agent)
            .field("max_retries", &self.max_retries)
            .field("backoff_factor", &self.backoff_factor)
            .finish()
    }
}
