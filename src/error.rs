//! Error types for Sora

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in Sora
#[derive(Error, Debug)]
pub enum Error {
    /// Transport-level HTTP error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Admin API answered with a non-200 status
    #[error("unexpected status code: {status}")]
    UnexpectedStatus { status: u16 },

    /// Response body could not be decoded
    #[error("Failed to decode response: {0}")]
    Json(#[from] serde_json::Error),

    /// Requested item does not exist upstream
    #[error("Item not found: {0}")]
    ItemNotFound(String),

    // =========================================================================
    // Cache Errors
    // =========================================================================
    /// A cache name was registered twice
    #[error("Cache name already registered: {0}")]
    DuplicateCacheName(String),

    /// A registered flush function failed
    #[error("Failed to flush cache {name}: {reason}")]
    Flush { name: String, reason: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
