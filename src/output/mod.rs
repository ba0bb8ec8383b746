//! Output module
//!
//! Writes Singer messages to the output channel.
//!
//! # Overview
//!
//! This module provides:
//! - `Message` - the SCHEMA, RECORD and STATE messages
//! - `MessageWriter` - newline-delimited JSON writer with per-kind counts
//!
//! Standard output is the data channel; diagnostics go to standard error
//! through `tracing` and never through this module.

mod message;
mod writer;

pub use message::Message;
pub use writer::{MessageCounts, MessageWriter};
