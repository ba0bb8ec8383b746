//! CLI runner - executes the tap

use crate::catalog::{discover, Catalog};
use crate::cli::commands::Cli;
use crate::config::TapConfig;
use crate::engine::SyncEngine;
use crate::error::Result;
use crate::http::HttpClient;
use crate::output::MessageWriter;
use crate::schema::{bundled_schemas, load_schemas_from_dir, SchemaMap};
use crate::state::StateManager;
use std::io::Write;
use tracing::{debug, info};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the tap against standard output
    pub async fn run(&self) -> Result<()> {
        self.run_to(std::io::stdout()).await
    }

    /// Run the tap, writing discovery or sync output to `out`
    pub async fn run_to<W: Write>(&self, mut out: W) -> Result<()> {
        let config = TapConfig::from_file(&self.cli.config)?;
        debug!("Loaded config: {config:?}");

        let schemas = self.load_schemas()?;

        if self.cli.discover {
            info!("Running discovery");
            return discover(&schemas).dump(&mut out);
        }

        self.sync(config, &schemas, out).await
    }

    /// Sync the selected streams
    async fn sync<W: Write>(&self, config: TapConfig, schemas: &SchemaMap, out: W) -> Result<()> {
        let catalog = self.load_catalog(schemas)?;
        let state = self.load_state()?;
        let client = HttpClient::from_tap_config(&config)?;

        let mut engine = SyncEngine::new(client, config, state);
        let mut writer = MessageWriter::new(out);
        engine.sync(&catalog, &mut writer).await?;

        let counts = writer.counts();
        debug!(
            "Wrote {} messages ({} schema, {} record, {} state)",
            counts.total(),
            counts.schema,
            counts.record,
            counts.state
        );
        Ok(())
    }

    fn load_schemas(&self) -> Result<SchemaMap> {
        match &self.cli.schemas_dir {
            Some(dir) => load_schemas_from_dir(dir),
            None => bundled_schemas(),
        }
    }

    /// Catalog from `--catalog`, or every discovered stream selected
    fn load_catalog(&self, schemas: &SchemaMap) -> Result<Catalog> {
        match &self.cli.catalog {
            Some(path) => Catalog::from_file(path),
            None => Ok(discover(schemas).with_all_selected()),
        }
    }

    fn load_state(&self) -> Result<StateManager> {
        match &self.cli.state {
            Some(path) => StateManager::from_file(path),
            None => Ok(StateManager::in_memory()),
        }
    }
}
