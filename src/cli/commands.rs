//! CLI arguments

use clap::Parser;
use std::path::PathBuf;

/// Singer tap for Opsgenie alerts
#[derive(Parser, Debug, Clone)]
#[command(name = "tap-opsgenie")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (JSON)
    #[arg(short, long)]
    pub config: PathBuf,

    /// State file (JSON); bookmarks are read from and written to it
    #[arg(short, long)]
    pub state: Option<PathBuf>,

    /// Catalog file selecting the streams to sync
    #[arg(short = 'p', long, visible_alias = "properties")]
    pub catalog: Option<PathBuf>,

    /// Print the catalog of available streams and exit
    #[arg(short, long)]
    pub discover: bool,

    /// Directory of stream schema files, replacing the bundled schemas
    #[arg(long)]
    pub schemas_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}
