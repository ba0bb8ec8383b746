//! Common types used throughout tap-opsgenie
//!
//! This module contains shared type definitions, type aliases,
//! and timestamp helpers used across multiple modules.

use crate::error::{Error, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

// ============================================================================
// Replication Method
// ============================================================================

/// How a stream is replicated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReplicationMethod {
    /// Only records changed since the bookmark
    Incremental,
    /// Every record on every run
    FullTable,
}

impl std::fmt::Display for ReplicationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReplicationMethod::Incremental => write!(f, "INCREMENTAL"),
            ReplicationMethod::FullTable => write!(f, "FULL_TABLE"),
        }
    }
}

// ============================================================================
// Timestamps
// ============================================================================

/// Parse a bookmark or `start_date` value.
///
/// Accepts RFC-3339, a naive date-time (read as UTC) or a bare date
/// (midnight UTC).
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    let trimmed = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Ok(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(naive.and_utc());
        }
    }

    Err(Error::timestamp(value, "not a recognised timestamp"))
}

// `T` separator, uppercase `Z` or a `+HH:MM` offset
static RFC3339: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(\.\d+)?(Z|[+-]\d{2}:\d{2})$").unwrap()
});

/// Parse a value that must be strict RFC-3339
pub fn parse_rfc3339(value: &str) -> Result<DateTime<Utc>> {
    if !RFC3339.is_match(value) {
        return Err(Error::timestamp(value, "not a strict RFC-3339 date-time"));
    }
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::timestamp(value, e.to_string()))
}

/// Render an instant in the canonical UTC form, e.g. `2023-05-01T10:00:00.000000Z`
pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}
