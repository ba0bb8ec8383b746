//! CLI module
//!
//! Command-line interface for running the tap.
//!
//! # Modes
//!
//! - `--discover` - print the catalog of available streams
//! - default - sync the selected streams to standard output

mod commands;
mod runner;

pub use commands::Cli;
pub use runner::Runner;
