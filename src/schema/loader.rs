//! Schema loading from bundled files or a directory

use crate::error::{Error, Result};
use crate::types::JsonValue;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Schemas keyed by stream id
pub type SchemaMap = BTreeMap<String, JsonValue>;

/// Schema files compiled into the binary: (stream id, contents)
const BUNDLED: &[(&str, &str)] = &[("alerts", include_str!("../../schemas/alerts.json"))];

/// Parse one schema document
pub fn parse_schema(name: &str, contents: &str) -> Result<JsonValue> {
    let schema: JsonValue =
        serde_json::from_str(contents).map_err(|e| Error::schema_load(name, e.to_string()))?;

    if !schema.is_object() {
        return Err(Error::schema_load(name, "schema must be a JSON object"));
    }

    Ok(schema)
}

/// Schemas shipped with the tap
pub fn bundled_schemas() -> Result<SchemaMap> {
    BUNDLED
        .iter()
        .map(|(name, contents)| Ok(((*name).to_string(), parse_schema(name, contents)?)))
        .collect()
}

/// Load every `*.json` file in `dir`, keyed by file stem
pub fn load_schemas_from_dir(dir: impl AsRef<Path>) -> Result<SchemaMap> {
    let dir = dir.as_ref();
    let display = dir.display().to_string();

    let entries =
        std::fs::read_dir(dir).map_err(|e| Error::schema_load(&display, e.to_string()))?;

    let mut schemas = SchemaMap::new();
    for entry in entries {
        let path = entry
            .map_err(|e| Error::schema_load(&display, e.to_string()))?
            .path();

        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };

        let path_display = path.display().to_string();
        let contents = std::fs::read_to_string(&path)
            .map_err(|e| Error::schema_load(&path_display, e.to_string()))?;

        debug!("Loaded schema {} from {}", stem, path_display);
        schemas.insert(stem.to_string(), parse_schema(&path_display, &contents)?);
    }

    Ok(schemas)
}
