//! Catalog and discovery
//!
//! The catalog lists the streams the tap can produce together with their
//! schemas, key properties and replication settings. Discovery builds it
//! from the loaded schemas and a static per-stream metadata table; a
//! catalog file handed to the tap decides which streams get synced.

mod discovery;
mod types;

pub use discovery::{discover, stream_metadata, StreamMetadata, ALERTS_STREAM, CURSOR_FIELD};
pub use types::{Catalog, CatalogEntry, MetadataEntry};
