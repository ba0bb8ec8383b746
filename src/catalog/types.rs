//! Catalog types
//!
//! Serialized in the Singer catalog layout so that catalogs produced by
//! `--discover` can be edited and passed back with `--catalog`.

use crate::error::{Error, Result, ResultExt};
use crate::types::{JsonObject, JsonValue, ReplicationMethod};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;

/// Metadata attached to a stream (empty breadcrumb) or one of its fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataEntry {
    /// Path to the described node; empty for the stream itself
    pub breadcrumb: Vec<String>,
    /// Metadata key/value pairs
    pub metadata: JsonObject,
}

impl MetadataEntry {
    /// Create a metadata entry
    pub fn new(breadcrumb: Vec<String>, metadata: JsonObject) -> Self {
        Self {
            breadcrumb,
            metadata,
        }
    }
}

/// One syncable stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Stream identifier
    pub tap_stream_id: String,

    /// Stream name
    #[serde(default)]
    pub stream: String,

    /// JSON schema of the records
    pub schema: JsonValue,

    /// Fields that uniquely identify a record
    #[serde(default)]
    pub key_properties: Vec<String>,

    /// Field used as the incremental cursor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication_key: Option<String>,

    /// Replication method
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication_method: Option<ReplicationMethod>,

    /// Stream and field metadata
    #[serde(default)]
    pub metadata: Vec<MetadataEntry>,
}

impl CatalogEntry {
    /// Stream name, falling back to the stream id
    pub fn name(&self) -> &str {
        if self.stream.is_empty() {
            &self.tap_stream_id
        } else {
            &self.stream
        }
    }

    /// Stream-level metadata (empty breadcrumb)
    pub fn stream_metadata(&self) -> Option<&JsonObject> {
        self.metadata
            .iter()
            .find(|m| m.breadcrumb.is_empty())
            .map(|m| &m.metadata)
    }

    /// Mutable stream-level metadata, creating it if needed
    pub fn stream_metadata_mut(&mut self) -> &mut JsonObject {
        let index = match self.metadata.iter().position(|m| m.breadcrumb.is_empty()) {
            Some(index) => index,
            None => {
                self.metadata
                    .insert(0, MetadataEntry::new(Vec::new(), JsonObject::new()));
                0
            }
        };
        &mut self.metadata[index].metadata
    }

    /// Whether the stream is selected for sync.
    ///
    /// Selected through stream metadata `selected: true` or the legacy
    /// `selected: true` flag on the schema.
    pub fn is_selected(&self) -> bool {
        let by_metadata = self
            .stream_metadata()
            .and_then(|m| m.get("selected"))
            .and_then(JsonValue::as_bool);

        let by_schema = self.schema.get("selected").and_then(JsonValue::as_bool);

        by_metadata.or(by_schema).unwrap_or(false)
    }

    /// Mark the stream as selected
    pub fn select(&mut self) {
        self.stream_metadata_mut()
            .insert("selected".to_string(), JsonValue::Bool(true));
    }
}

/// Set of stream descriptors
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    /// All streams
    pub streams: Vec<CatalogEntry>,
}

impl Catalog {
    /// Create a catalog from entries
    pub fn new(streams: Vec<CatalogEntry>) -> Self {
        Self { streams }
    }

    /// Load a catalog from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog file {}", path.display()))?;
        Self::from_json(&contents)
    }

    /// Parse a catalog from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::catalog(format!("Invalid catalog: {e}")))
    }

    /// Streams selected for sync, in catalog order
    pub fn selected_streams(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.streams.iter().filter(|s| s.is_selected())
    }

    /// Select every stream
    #[must_use]
    pub fn with_all_selected(mut self) -> Self {
        for stream in &mut self.streams {
            stream.select();
        }
        self
    }

    /// Write the catalog as pretty JSON
    pub fn dump<W: Write>(&self, mut writer: W) -> Result<()> {
        serde_json::to_writer_pretty(&mut writer, self)?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }
}
