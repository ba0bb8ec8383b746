//! # tap-opsgenie
//!
//! A Singer tap that extracts alerts from the Opsgenie REST API.
//!
//! ## Features
//!
//! - **Discovery**: a catalog built from the bundled JSON schemas
//! - **Incremental Sync**: alerts updated since the last bookmark, oldest first
//! - **Header Pagination**: follows `X-Paging-Next` until the last page
//! - **Retries**: transient failures retried with exponential backoff
//! - **Normalized Timestamps**: every `date-time` field rendered in UTC
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tap_opsgenie::{
//!     catalog::discover, config::TapConfig, engine::SyncEngine, http::HttpClient,
//!     output::MessageWriter, schema::bundled_schemas, state::StateManager,
//! };
//!
//! #[tokio::main]
//! async fn main() -> tap_opsgenie::Result<()> {
//!     let config = TapConfig::from_file("config.json")?;
//!     let catalog = discover(&bundled_schemas()?).with_all_selected();
//!
//!     let client = HttpClient::from_tap_config(&config)?;
//!     let state = StateManager::from_file("state.json")?;
//!     let mut engine = SyncEngine::new(client, config, state);
//!
//!     engine.sync(&catalog, &mut MessageWriter::stdout()).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                            Runner                               │
//! │   --discover → Catalog        sync(catalog, state) → stdout     │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────┬───────────┬───────┴───────┬───────────┬─────────────┐
//! │   Auth   │   HTTP    │   Paginate    │ Transform │   Output    │
//! ├──────────┼───────────┼───────────────┼───────────┼─────────────┤
//! │ GenieKey │ GET       │ X-Paging-Next │ Types     │ SCHEMA      │
//! │          │ Retry     │               │ date-time │ RECORD      │
//! │          │           │               │           │ STATE       │
//! └──────────┴───────────┴───────────────┴───────────┴─────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_possible_truncation)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and timestamp helpers
pub mod types;

/// Tap configuration
pub mod config;

/// Authentication
pub mod auth;

/// HTTP client with retry
pub mod http;

/// Pagination strategies
pub mod pagination;

/// Stream schemas
pub mod schema;

/// Catalog and discovery
pub mod catalog;

/// Record transformation
pub mod transform;

/// Stream fetchers
pub mod streams;

/// State management
pub mod state;

/// Singer message output
pub mod output;

/// Main execution engine
pub mod engine;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
