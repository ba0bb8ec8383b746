//! Stream fetchers
//!
//! Each supported stream has a fetcher that turns a bookmark into a lazy
//! sequence of raw records. Only one page is held in memory at a time.

mod alerts;

pub use alerts::{alerts_query, fetch_alert_pages, fetch_alerts, PAGE_SIZE};
