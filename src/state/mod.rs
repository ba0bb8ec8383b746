//! State management module
//!
//! Handles bookmark tracking and persistence between runs.
//!
//! # Overview
//!
//! The state module provides:
//! - `State` - bookmarks per stream, in the Singer state layout
//! - `StateManager` - file-based state persistence
//!
//! The state file is the only artifact that survives a run. It is
//! overwritten as a whole after each stream completes.

mod manager;
mod types;

pub use manager::StateManager;
pub use types::State;
