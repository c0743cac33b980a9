//! Singular Cache
//!
//! A named cache holding exactly one value process-wide, e.g. the full item
//! list.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, instrument};

use super::entry::CacheEntry;
use super::metrics::{CacheStats, StatsSnapshot};

/// Named single-slot cache
#[derive(Debug)]
pub struct SingularCache<T> {
    name: String,
    entry: CacheEntry<T>,
}

impl<T> SingularCache<T> {
    /// Create an empty cache
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entry: CacheEntry::new(),
        }
    }

    /// Cache name used in logs and the registry
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Store a value for `ttl`
    pub fn set(&self, value: T, ttl: Duration) {
        self.entry.write(value, ttl);
    }

    /// Clear the slot regardless of freshness
    #[instrument(skip(self), fields(cache = %self.name))]
    pub fn delete(&self) {
        self.entry.clear();
        self.entry.stats().record_flush();
        info!("cache deleted");
    }

    /// Shared stats block
    pub(crate) fn stats_handle(&self) -> Arc<CacheStats> {
        Arc::clone(self.entry.stats())
    }

    /// Point-in-time counters
    pub fn stats(&self) -> StatsSnapshot {
        self.entry.stats().snapshot()
    }
}

impl<T: Clone> SingularCache<T> {
    /// Get the cached value if it is fresh
    pub fn get(&self) -> Option<T> {
        self.entry.read()
    }

    /// Get the cached value, computing it at most once among concurrent callers
    pub fn mutex_get_set<F, E>(&self, compute: F, ttl: Duration) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        self.entry.get_or_compute(compute, ttl)
    }

    /// Async flavour of [`SingularCache::mutex_get_set`]
    pub async fn mutex_get_set_async<F, Fut, E>(&self, compute: F, ttl: Duration) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.entry.get_or_compute_async(compute, ttl).await
    }
}

// =============================================================================
// Tests
// =============================================================================
