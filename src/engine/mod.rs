//! Execution engine module
//!
//! Main sync loop and stream orchestration.
//!
//! # Overview
//!
//! The engine module provides:
//! - `SyncEngine` - Runs every selected stream and manages bookmarks
//! - `SyncStats` - Counters logged at the end of a run
//!
//! Streams are synced one after another. For each stream the schema is
//! written first, records follow as they are fetched, and the bookmark is
//! persisted only once the whole fetch sequence has completed.

mod types;

pub use types::{system_clock, Clock, SyncStats};

use crate::catalog::{Catalog, CatalogEntry, ALERTS_STREAM, CURSOR_FIELD};
use crate::config::TapConfig;
use crate::error::{Error, Result};
use crate::http::HttpClient;
use crate::output::{Message, MessageWriter};
use crate::state::StateManager;
use crate::streams::fetch_alert_pages;
use crate::transform::Transformer;
use crate::types::format_timestamp;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use std::io::Write;
use std::pin::pin;
use std::time::Instant;
use tracing::{info, warn};

/// Sync engine for orchestrating data extraction
pub struct SyncEngine {
    /// HTTP client
    client: HttpClient,
    /// Tap configuration
    config: TapConfig,
    /// State manager
    state: StateManager,
    /// Record transformer
    transformer: Transformer,
    /// Sync start time source
    clock: Clock,
    /// Statistics
    stats: SyncStats,
}

impl SyncEngine {
    /// Create a new sync engine
    pub fn new(client: HttpClient, config: TapConfig, state: StateManager) -> Self {
        Self {
            client,
            config,
            state,
            transformer: Transformer::timestamps(),
            clock: system_clock(),
            stats: SyncStats::default(),
        }
    }

    /// Replace the clock that stamps new bookmarks
    #[must_use]
    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        self.clock = Box::new(clock);
        self
    }

    /// Get the state manager
    pub fn state(&self) -> &StateManager {
        &self.state
    }

    /// Get statistics
    pub fn stats(&self) -> &SyncStats {
        &self.stats
    }

    /// Consume the engine and return its state manager
    pub fn into_state(self) -> StateManager {
        self.state
    }

    /// Sync every selected stream in the catalog
    pub async fn sync<W: Write>(
        &mut self,
        catalog: &Catalog,
        writer: &mut MessageWriter<W>,
    ) -> Result<SyncStats> {
        let start = Instant::now();

        if self.state.is_in_memory() {
            warn!("No state file given; bookmarks will not be persisted");
        }

        let mut selected = 0;
        for entry in catalog.selected_streams() {
            selected += 1;
            self.sync_stream(entry, writer).await?;
        }
        if selected == 0 {
            warn!("No streams selected");
        }

        self.stats.set_duration(start.elapsed().as_millis() as u64);
        info!(
            "Sync complete: {} records in {} pages across {} streams ({} ms)",
            self.stats.records_synced,
            self.stats.pages_fetched,
            self.stats.streams_synced,
            self.stats.duration_ms
        );

        Ok(self.stats.clone())
    }

    /// Sync a single catalog entry
    pub async fn sync_stream<W: Write>(
        &mut self,
        entry: &CatalogEntry,
        writer: &mut MessageWriter<W>,
    ) -> Result<()> {
        let stream_id = entry.tap_stream_id.as_str();
        match stream_id {
            ALERTS_STREAM => {}
            other => {
                return Err(Error::UnsupportedStream {
                    stream: other.to_string(),
                })
            }
        }

        let stream = entry.name();
        info!("Syncing stream: {stream}");

        writer.write(&Message::schema(
            stream,
            entry.schema.clone(),
            entry.key_properties.clone(),
            vec![CURSOR_FIELD.to_string()],
        ))?;

        let bookmark = self
            .state
            .get_bookmark(stream_id, CURSOR_FIELD)
            .map_or_else(|| self.config.start_date.clone(), str::to_string);
        let new_bookmark = format_timestamp(&(self.clock)());
        info!("Syncing from {bookmark}");
        info!("Syncing up to {new_bookmark}");

        let mut records = 0;
        let mut pages = pin!(fetch_alert_pages(&self.client, &self.config, &bookmark));
        while let Some(page) = pages.try_next().await? {
            self.stats.add_page();
            let extracted = Utc::now();

            for raw in page {
                let record = self.transformer.transform(&raw, &entry.schema)?;
                writer.write(&Message::record(stream, record, Some(extracted)))?;
                records += 1;
            }
        }
        self.stats.add_records(records);

        self.state.set_bookmark(stream_id, CURSOR_FIELD, new_bookmark);
        self.state.save().await?;
        writer.write(&Message::state(serde_json::to_value(self.state.state())?))?;

        self.stats.add_stream();
        info!("Completed sync for {stream}: {records} records");
        Ok(())
    }
}

impl std::fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("client", &self.client)
            .field("config", &self.config)
            .field("state", &self.state)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
