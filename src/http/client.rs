//! HTTP client with retry
//!
//! Provides the HTTP client that handles:
//! - Authentication on every request
//! - Automatic retries of transient failures with exponential backoff
//! - JSON response parsing

use super::retry::{with_backoff, RetryPolicy};
use crate::auth::Authenticator;
use crate::config::TapConfig;
use crate::error::{Error, Result};
use crate::types::JsonValue;
use reqwest::header::HeaderMap;
use reqwest::{Client, Method};
use std::collections::HashMap;
use tracing::{debug, error, info};

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Retry policy applied to every request
    pub retry: RetryPolicy,
    /// Default headers for all requests
    pub default_headers: HashMap<String, String>,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            default_headers: HashMap::new(),
            user_agent: format!("tap-opsgenie/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpClientConfig {
    /// Create a new config builder
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }

    /// Derive the client config from the tap config
    pub fn from_tap_config(config: &TapConfig) -> Self {
        let mut builder =
            Self::builder().retry(RetryPolicy::new(config.max_retries, config.backoff()));

        if let Some(agent) = &config.user_agent {
            builder = builder.user_agent(agent);
        }

        builder.build()
    }
}

/// Builder for HTTP client config
#[derive(Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Set the retry policy
    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.config.retry = policy;
        self
    }

    /// Add a default header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(key.into(), value.into());
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// A successful response with its JSON body already read
#[derive(Debug, Clone)]
pub struct JsonResponse {
    /// Fully resolved request URL
    pub url: String,
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: HeaderMap,
    /// Parsed body
    pub body: JsonValue,
}

impl JsonResponse {
    /// Header value as a string, if present and valid UTF-8
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// HTTP client with retry
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    authenticator: Authenticator,
}

impl HttpClient {
    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder().user_agent(&config.user_agent).build()?;

        Ok(Self {
            client,
            config,
            authenticator: Authenticator::None,
        })
    }

    /// Create a client with authentication
    pub fn with_auth(config: HttpClientConfig, authenticator: Authenticator) -> Result<Self> {
        let mut client = Self::with_config(config)?;
        client.authenticator = authenticator;
        Ok(client)
    }

    /// Create the Opsgenie client described by the tap config
    pub fn from_tap_config(config: &TapConfig) -> Result<Self> {
        Self::with_auth(
            HttpClientConfig::from_tap_config(config),
            Authenticator::genie_key(&config.api_token),
        )
    }

    /// Client configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// GET a JSON document.
    ///
    /// `query` is appended to `url`; pass an empty slice to request `url`
    /// exactly as given. Transient failures are retried per the retry
    /// policy. A response with status >= 400 that survives the retries is
    /// logged and returned as `Error::HttpStatus`.
    pub async fn get(&self, url: &str, query: &[(&str, String)]) -> Result<JsonResponse> {
        self.request_json(Method::GET, url, query).await
    }

    /// Make a request with retries and parse the JSON response
    pub async fn request_json(
        &self,
        method: Method,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<JsonResponse> {
        let result = with_backoff(&self.config.retry, Error::is_transient, |_| {
            self.send_once(method.clone(), url, query)
        })
        .await;

        if let Err(ref e) = result {
            if e.is_fatal_http() {
                error!("Error making request to Opsgenie API: {e}");
            }
        }

        result
    }

    /// Single request attempt
    async fn send_once(
        &self,
        method: Method,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<JsonResponse> {
        let mut req = self.client.request(method.clone(), url);

        for (key, value) in &self.config.default_headers {
            req = req.header(key.as_str(), value.as_str());
        }

        if !query.is_empty() {
            req = req.query(query);
        }

        req = self.authenticator.apply(req)?;

        let request = req.build()?;
        let resolved = request.url().to_string();
        info!("{} {}", method, resolved);

        let response = self.client.execute(request).await?;
        let status = response.status();
        let headers = response.headers().clone();

        if status.as_u16() >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::http_status(
                method.as_str(),
                resolved,
                status.as_u16(),
                body,
            ));
        }

        let bytes = response.bytes().await?;
        let body: JsonValue = serde_json::from_slice(&bytes).map_err(|e| {
            Error::decode(format!("Invalid JSON from {method} {resolved}: {e}"))
        })?;

        debug!("Request succeeded: {} {}", method, resolved);
        Ok(JsonResponse {
            url: resolved,
            status: status.as_u16(),
            headers,
            body,
        })
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .field("authenticator", &self.authenticator)
            .finish_non_exhaustive()
    }
}
