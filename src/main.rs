//! tap-opsgenie CLI
//!
//! Extracts Opsgenie alerts as Singer messages on standard output

use clap::Parser;
use tap_opsgenie::cli::{Cli, Runner};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Standard output carries the data; logs go to standard error
    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();

    let runner = Runner::new(cli);

    if let Err(e) = runner.run().await {
        error!("{e}");
        std::process::exit(1);
    }
}
