//! State types for tracking sync progress
//!
//! These types are serialized to JSON and persisted between runs:
//!
//! ```json
//! { "bookmarks": { "alerts": { "updatedAt": "2023-05-01T10:00:00.000000Z" } } }
//! ```

use crate::types::JsonObject;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Complete state for the tap
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct State {
    /// Per-stream bookmarks: stream id -> bookmark key -> value
    #[serde(default)]
    pub bookmarks: BTreeMap<String, BTreeMap<String, String>>,

    /// Top-level keys this tap does not use, kept as they were
    #[serde(flatten)]
    pub extra: JsonObject,
}

impl State {
    /// Create a new empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a bookmark value
    pub fn get_bookmark(&self, stream: &str, key: &str) -> Option<&str> {
        self.bookmarks.get(stream)?.get(key).map(String::as_str)
    }

    /// Set a bookmark value
    pub fn set_bookmark(&mut self, stream: &str, key: &str, value: impl Into<String>) {
        self.bookmarks
            .entry(stream.to_string())
            .or_default()
            .insert(key.to_string(), value.into());
    }
}
