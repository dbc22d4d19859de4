//! Client configuration.
//!
//! A `ClientConfig` is built once per API key and never mutated afterwards.
//! Everything except the key has a default matching the production API.

use std::env;

use crate::error::ApiError;

/// Production endpoint of the Signifyd v2 API.
pub const DEFAULT_BASE_URL: &str = "https://api.signifyd.com/v2/";

pub const ENV_API_KEY: &str = "SIGNIFYD_API_KEY";
pub const ENV_API_URL: &str = "SIGNIFYD_API_URL";
pub const ENV_ACCEPT_INVALID_CERTS: &str = "SIGNIFYD_ACCEPT_INVALID_CERTS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    api_key: String,
    base_url: String,
    accept_invalid_certs: bool,
    accept_on_create: bool,
}

impl ClientConfig {
    /// Configuration for `api_key` against the production endpoint, with
    /// certificate verification on.
    pub fn new(api_key: &str) -> Result<Self, ApiError> {
        if api_key.trim().is_empty() {
            return Err(ApiError::Config("API key must not be empty".to_string()));
        }
        Ok(Self {
            api_key: api_key.to_string(),
            base_url: DEFAULT_BASE_URL.trim_end_matches('/').to_string(),
            accept_invalid_certs: false,
            accept_on_create: true,
        })
    }

    /// Read `SIGNIFYD_API_KEY` (required), `SIGNIFYD_API_URL` and
    /// `SIGNIFYD_ACCEPT_INVALID_CERTS` from the environment.
    pub fn from_env() -> Result<Self, ApiError> {
        let api_key = env::var(ENV_API_KEY).map_err(|_| ApiError::Config(format!("{ENV_API_KEY} is not set")))?;
        let mut config = Self::new(&api_key)?;
        if let Ok(url) = env::var(ENV_API_URL) {
            config = config.with_base_url(&url);
        }
        if let Ok(flag) = env::var(ENV_ACCEPT_INVALID_CERTS) {
            config = config.with_accept_invalid_certs(parse_flag(&flag));
        }
        Ok(config)
    }

    /// Point the client at another endpoint. A trailing `/` is ignored.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Skip TLS certificate verification. Only for test environments with
    /// self-signed certificates.
    pub fn with_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Whether `create_case` sends `Accept: application/json`.
    pub fn with_accept_on_create(mut self, accept: bool) -> Self {
        self.accept_on_create = accept;
        self
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn accept_invalid_certs(&self) -> bool {
        self.accept_invalid_certs
    }

    pub fn accept_on_create(&self) -> bool {
        self.accept_on_create
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
