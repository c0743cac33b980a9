//! Admin API Client
//!
//! Thin JSON-over-HTTP client authenticated with a bearer token.

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::config::ClientConfig;
use crate::error::{Error, Result};

/// Path of the game-data seed endpoint
pub const GAME_DATA_SEED_PATH: &str = "/cli/gamedata/seed";

/// Authenticated admin API client
#[derive(Debug, Clone)]
pub struct AdminClient {
    config: ClientConfig,
    http: Client,
}

impl AdminClient {
    /// Create a client from a validated configuration
    pub fn new(config: ClientConfig) -> Result<Self> {
        let config = config.validate()?;
        let http = Client::builder().timeout(config.timeout).build()?;

        debug!(base_url = %config.base_url, "creating admin API client");
        Ok(Self { config, http })
    }

    /// Base URL requests are issued against
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Full URL for an API path
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    /// GET `path` and decode the JSON body
    #[instrument(skip(self))]
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self
            .http
            .get(self.url(path))
            .bearer_auth(&self.config.token)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(Error::UnexpectedStatus {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        debug!(bytes = body.len(), "response received");
        Ok(serde_json::from_slice(&body)?)
    }
}
