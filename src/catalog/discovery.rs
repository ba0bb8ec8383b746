//! Discovery: catalog entries from schemas and the static metadata table

use super::types::{Catalog, CatalogEntry, MetadataEntry};
use crate::schema::SchemaMap;
use crate::types::{JsonObject, JsonValue, ReplicationMethod};
use serde_json::json;

/// Id of the alerts stream
pub const ALERTS_STREAM: &str = "alerts";

/// Field used as the incremental cursor and bookmark key
pub const CURSOR_FIELD: &str = "updatedAt";

/// Static replication settings of a stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamMetadata {
    /// Fields that uniquely identify a record
    pub key_properties: &'static [&'static str],
    /// Incremental cursor field
    pub replication_key: Option<&'static str>,
    /// Replication method
    pub replication_method: Option<ReplicationMethod>,
}

const ALERTS: StreamMetadata = StreamMetadata {
    key_properties: &["tinyId"],
    replication_key: Some(CURSOR_FIELD),
    replication_method: Some(ReplicationMethod::Incremental),
};

/// Replication settings for a known stream id
pub fn stream_metadata(stream_id: &str) -> Option<&'static StreamMetadata> {
    match stream_id {
        ALERTS_STREAM => Some(&ALERTS),
        _ => None,
    }
}

/// Build the catalog: one entry per schema, ordered by stream id.
///
/// Streams missing from the metadata table get no key properties and no
/// replication settings.
pub fn discover(schemas: &SchemaMap) -> Catalog {
    let streams = schemas
        .iter()
        .map(|(stream_id, schema)| build_entry(stream_id, schema))
        .collect();

    Catalog::new(streams)
}

fn build_entry(stream_id: &str, schema: &JsonValue) -> CatalogEntry {
    let meta = stream_metadata(stream_id);

    let key_properties: Vec<String> = meta
        .map(|m| m.key_properties.iter().map(ToString::to_string).collect())
        .unwrap_or_default();
    let replication_key = meta.and_then(|m| m.replication_key).map(str::to_string);
    let replication_method = meta.and_then(|m| m.replication_method);

    let metadata = build_metadata(
        schema,
        &key_properties,
        replication_key.as_deref(),
        replication_method,
    );

    CatalogEntry {
        tap_stream_id: stream_id.to_string(),
        stream: stream_id.to_string(),
        schema: schema.clone(),
        key_properties,
        replication_key,
        replication_method,
        metadata,
    }
}

fn build_metadata(
    schema: &JsonValue,
    key_properties: &[String],
    replication_key: Option<&str>,
    replication_method: Option<ReplicationMethod>,
) -> Vec<MetadataEntry> {
    let mut stream = JsonObject::new();
    stream.insert("table-key-properties".to_string(), json!(key_properties));
    if let Some(key) = replication_key {
        stream.insert("valid-replication-keys".to_string(), json!([key]));
    }
    if let Some(method) = replication_method {
        stream.insert(
            "forced-replication-method".to_string(),
            json!(method.to_string()),
        );
    }

    let mut entries = vec![MetadataEntry::new(Vec::new(), stream)];

    if let Some(properties) = schema.get("properties").and_then(JsonValue::as_object) {
        for name in properties.keys() {
            let automatic = key_properties.iter().any(|k| k == name)
                || replication_key == Some(name.as_str());
            let mut field = JsonObject::new();
            field.insert(
                "inclusion".to_string(),
                json!(if automatic { "automatic" } else { "available" }),
            );
            entries.push(MetadataEntry::new(
                vec!["properties".to_string(), name.clone()],
                field,
            ));
        }
    }

    entries
}
