//! Authentication module
//!
//! Opsgenie authenticates API integrations with a `GenieKey` scheme in the
//! `Authorization` header. The `Authenticator` applies it to every request.

use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::RequestBuilder;

use crate::error::{Error, Result};

/// Authorization scheme used by the Opsgenie API
pub const GENIE_KEY_SCHEME: &str = "GenieKey";

/// Applies credentials to outgoing requests
#[derive(Clone, Default)]
pub enum Authenticator {
    /// No authentication
    #[default]
    None,
    /// `Authorization: GenieKey <token>`
    GenieKey {
        /// The API integration key
        token: String,
    },
}

impl Authenticator {
    /// Create a GenieKey authenticator
    pub fn genie_key(token: impl Into<String>) -> Self {
        Self::GenieKey {
            token: token.into(),
        }
    }

    /// Value for the `Authorization` header, if any
    pub fn header_value(&self) -> Result<Option<HeaderValue>> {
        match self {
            Authenticator::None => Ok(None),
            Authenticator::GenieKey { token } => {
                let mut value = HeaderValue::from_str(&format!("{GENIE_KEY_SCHEME} {token}"))
                    .map_err(|e| Error::invalid_value("api_token", e.to_string()))?;
                value.set_sensitive(true);
                Ok(Some(value))
            }
        }
    }

    /// Apply authentication to a request builder
    pub fn apply(&self, req: RequestBuilder) -> Result<RequestBuilder> {
        Ok(match self.header_value()? {
            Some(value) => req.header(AUTHORIZATION, value),
            None => req,
        })
    }
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Authenticator::None => write!(f, "Authenticator::None"),
            Authenticator::GenieKey { .. } => write!(f, "Authenticator::GenieKey(***)"),
        }
    }
}
