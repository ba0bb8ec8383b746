//! Record transformation
//!
//! Walks each record against its stream schema before it is emitted.
//! Values are checked against the declared types and date-time strings are
//! rewritten into one canonical UTC form.
//!
//! # Rules
//!
//! - Candidate types from `type` are tried in declared order
//! - `null` only matches null
//! - Objects recurse into `properties` and `patternProperties`
//! - Arrays recurse into `items`
//! - `anyOf` tries each sub-schema in turn
//! - Fields the schema does not mention pass through unchanged
//! - A value matching none of its declared types passes through unchanged

use crate::error::{Error, Result};
use crate::schema::{declared_types, format_of, JsonType};
use crate::types::{format_timestamp, parse_rfc3339, JsonObject, JsonValue};
use regex::Regex;
use tracing::debug;

/// Hook run for every candidate type before the type check.
///
/// Returns a replacement value, or `None` to keep the value as it is.
pub type PreHook =
    Box<dyn Fn(&JsonValue, JsonType, &JsonValue) -> Result<Option<JsonValue>> + Send + Sync>;

/// Rewrite a `date-time` string as UTC with microsecond precision.
///
/// Any other combination of value, type and format is returned unchanged.
pub fn normalize_timestamp(
    value: &JsonValue,
    json_type: JsonType,
    field_schema: &JsonValue,
) -> Result<JsonValue> {
    match (json_type, format_of(field_schema), value) {
        (JsonType::String, Some("date-time"), JsonValue::String(s)) => {
            let dt = parse_rfc3339(s)?;
            Ok(JsonValue::String(format_timestamp(&dt)))
        }
        _ => Ok(value.clone()),
    }
}

/// Schema-driven record transformer
pub struct Transformer {
    pre_hook: Option<PreHook>,
}

impl Transformer {
    /// Transformer that only checks types
    pub fn new() -> Self {
        Self { pre_hook: None }
    }

    /// Transformer with a custom pre-hook
    pub fn with_pre_hook<F>(hook: F) -> Self
    where
        F: Fn(&JsonValue, JsonType, &JsonValue) -> Result<Option<JsonValue>>
            + Send
            + Sync
            + 'static,
    {
        Self {
            pre_hook: Some(Box::new(hook)),
        }
    }

    /// Transformer that normalizes `date-time` strings
    pub fn timestamps() -> Self {
        Self::with_pre_hook(|value, json_type, schema| {
            let is_date_time = json_type == JsonType::String
                && value.is_string()
                && format_of(schema) == Some("date-time");
            if is_date_time {
                normalize_timestamp(value, json_type, schema).map(Some)
            } else {
                Ok(None)
            }
        })
    }

    /// Transform a whole record against its stream schema
    pub fn transform(&self, record: &JsonValue, schema: &JsonValue) -> Result<JsonValue> {
        self.transform_value(record, schema, "")
    }

    fn transform_value(&self, value: &JsonValue, schema: &JsonValue, path: &str) -> Result<JsonValue> {
        match self.match_value(value, schema, path)? {
            Some(out) => Ok(out),
            None => {
                debug!(
                    path = %display_path(path),
                    found = kind_of(value),
                    "Value matches no declared type, passing it through"
                );
                Ok(value.clone())
            }
        }
    }

    /// `None` when the value matches none of the schema's types
    fn match_value(
        &self,
        value: &JsonValue,
        schema: &JsonValue,
        path: &str,
    ) -> Result<Option<JsonValue>> {
        if let Some(any_of) = schema.get("anyOf").and_then(JsonValue::as_array) {
            for sub_schema in any_of {
                if let Some(out) = self.match_value(value, sub_schema, path)? {
                    return Ok(Some(out));
                }
            }
            return Ok(None);
        }

        let types = declared_types(schema);
        if types.is_empty() {
            return match value.as_object() {
                Some(map) => self.transform_object(map, schema, path).map(Some),
                None => Ok(Some(value.clone())),
            };
        }

        for json_type in types {
            if let Some(out) = self.try_type(value, json_type, schema, path)? {
                return Ok(Some(out));
            }
        }
        Ok(None)
    }

    fn try_type(
        &self,
        value: &JsonValue,
        json_type: JsonType,
        schema: &JsonValue,
        path: &str,
    ) -> Result<Option<JsonValue>> {
        if value.is_null() || json_type == JsonType::Null {
            let both_null = value.is_null() && json_type == JsonType::Null;
            return Ok(both_null.then_some(JsonValue::Null));
        }

        let replaced = match &self.pre_hook {
            Some(hook) => hook(value, json_type, schema)?,
            None => None,
        };
        let value = replaced.as_ref().unwrap_or(value);

        match json_type {
            JsonType::Object => match value.as_object() {
                Some(map) => self.transform_object(map, schema, path).map(Some),
                None => Ok(None),
            },
            JsonType::Array => match value.as_array() {
                Some(items) => self.transform_array(items, schema, path).map(Some),
                None => Ok(None),
            },
            _ => Ok(json_type.matches(value).then(|| value.clone())),
        }
    }

    fn transform_object(&self, map: &JsonObject, schema: &JsonValue, path: &str) -> Result<JsonValue> {
        let properties = schema.get("properties").and_then(JsonValue::as_object);
        let patterns = compile_patterns(schema, path)?;

        let mut out = JsonObject::with_capacity(map.len());
        for (key, value) in map {
            let field_path = join_path(path, key);
            let field_schema = properties.and_then(|p| p.get(key)).or_else(|| {
                patterns
                    .iter()
                    .find(|(re, _)| re.is_match(key))
                    .map(|(_, s)| *s)
            });

            let transformed = match field_schema {
                Some(field_schema) => self.transform_value(value, field_schema, &field_path)?,
                None => value.clone(),
            };
            out.insert(key.clone(), transformed);
        }
        Ok(JsonValue::Object(out))
    }

    fn transform_array(&self, items: &[JsonValue], schema: &JsonValue, path: &str) -> Result<JsonValue> {
        let Some(item_schema) = schema.get("items") else {
            return Ok(JsonValue::Array(items.to_vec()));
        };

        items
            .iter()
            .enumerate()
            .map(|(i, item)| self.transform_value(item, item_schema, &format!("{path}[{i}]")))
            .collect::<Result<Vec<_>>>()
            .map(JsonValue::Array)
    }
}

impl Default for Transformer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Transformer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transformer")
            .field("has_pre_hook", &self.pre_hook.is_some())
            .finish()
    }
}

fn compile_patterns<'a>(schema: &'a JsonValue, path: &str) -> Result<Vec<(Regex, &'a JsonValue)>> {
    let Some(pattern_properties) = schema.get("patternProperties").and_then(JsonValue::as_object)
    else {
        return Ok(Vec::new());
    };

    pattern_properties
        .iter()
        .map(|(pattern, sub_schema)| {
            Regex::new(pattern)
                .map(|re| (re, sub_schema))
                .map_err(|e| {
                    Error::schema_mismatch(
                        display_path(path),
                        format!("invalid pattern '{pattern}': {e}"),
                    )
                })
        })
        .collect()
}

fn join_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

fn display_path(path: &str) -> String {
    if path.is_empty() {
        "<record>".to_string()
    } else {
        path.to_string()
    }
}

fn kind_of(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(n) if n.is_f64() => "number",
        JsonValue::Number(_) => "integer",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
