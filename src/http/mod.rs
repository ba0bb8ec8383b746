//! HTTP client module
//!
//! Provides the HTTP client used to talk to the Opsgenie API.
//!
//! # Features
//!
//! - **Automatic Retries**: transient failures are retried with exponential backoff
//! - **Client Errors**: 4xx responses are never retried
//! - **Authentication**: GenieKey header applied to every request

mod client;
mod retry;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder, JsonResponse};
pub use retry::{with_backoff, RetryPolicy};

#[cfg(test)]
mod tests;
