//! Sora - Penguin Statistics Admin CLI
//!
//! Fetches game data from the admin API through a process-local, named,
//! TTL-expiring cache that operators can invalidate by name.
//!
//! # Architecture
//!
//! ```text
//! Services (ItemService) → Cache Catalog (Singular / Set caches) → GameDataSource
//!                                   ▲
//!                  Registry ────────┘  (invalidate by name)
//! ```
//!
//! # Modules
//!
//! - [`cache`] - Cache entry core, Singular and Set caches, invalidation registry
//! - [`catalog`] - Every named cache of the tool and its one-time initialization
//! - [`client`] - Admin API HTTP client
//! - [`config`] - Client configuration and cache TTLs
//! - [`error`] - Error types
//! - [`models`] - Game-data payload types
//! - [`services`] - Cached data-access services

pub mod cache;
pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use cache::{CacheKind, Invalidation, Registry, SetCache, SingularCache};
pub use catalog::{CacheContext, Caches};
pub use client::AdminClient;
pub use config::{CacheTtls, ClientConfig};
pub use error::{Error, Result};
pub use services::{GameDataSource, ItemService};
