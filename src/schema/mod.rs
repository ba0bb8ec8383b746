//! Stream schemas
//!
//! Every syncable stream is described by a JSON schema file. The files in
//! `schemas/` are compiled into the binary; a directory of schema files can
//! be loaded instead for local overrides.
//!
//! # Features
//!
//! - **Bundled Schemas**: `alerts.json` embedded with `include_str!`
//! - **Directory Loading**: one stream per `*.json` file, keyed by file stem
//! - **Type Helpers**: declared types and formats for the record transformer

mod loader;
mod types;

pub use loader::{bundled_schemas, load_schemas_from_dir, parse_schema, SchemaMap};
pub use types::{declared_types, format_of, JsonType};
