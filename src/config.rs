//! Runtime configuration

use std::time::Duration;

use crate::error::{Error, Result};

/// Default admin API base URL, without trailing slash
pub const DEFAULT_BASE_URL: &str = "https://penguin-stats.io/api/admin";

/// Default HTTP request timeout
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Admin API client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the admin API, without trailing slash
    pub base_url: String,
    /// Bearer token
    pub token: String,
    /// Per-request timeout; bounds how long a cache supplier can block
    pub timeout: Duration,
}

impl ClientConfig {
    /// Create a configuration with the default timeout
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Reject unusable values and strip a trailing slash from the base URL
    pub fn validate(mut self) -> Result<Self> {
        if self.token.trim().is_empty() {
            return Err(Error::Config("bearer token must not be empty".to_string()));
        }
        while self.base_url.ends_with('/') {
            self.base_url.pop();
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "base URL must be http(s): {}",
                self.base_url
            )));
        }
        if self.timeout.is_zero() {
            return Err(Error::Config("request timeout must be positive".to_string()));
        }
        Ok(self)
    }
}

/// Time-to-live per cache call site
#[derive(Debug, Clone)]
pub struct CacheTtls {
    /// Game-data seed (the full item list)
    pub game_data_seed: Duration,
    /// Item maps derived from the seed
    pub items_map: Duration,
    /// Single item by ark id
    pub item: Duration,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            game_data_seed: Duration::from_secs(24 * 60 * 60),
            items_map: Duration::from_secs(24 * 60 * 60),
            item: Duration::from_secs(24 * 60 * 60),
        }
    }
}
