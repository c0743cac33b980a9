//! Cache Statistics
//!
//! Lock-free per-cache counters, shared by a named cache and all of its entries.

use std::sync::atomic::{AtomicU64, Ordering};

/// Per-cache counters
#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    /// Callers that waited on the population lock and found the value already written
    coalesced: AtomicU64,
    computations: AtomicU64,
    compute_failures: AtomicU64,
    flushes: AtomicU64,
}

impl CacheStats {
    /// Create a zeroed stats block
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_coalesced(&self) {
        self.coalesced.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_computation(&self) {
        self.computations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_compute_failure(&self) {
        self.compute_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_flush(&self) {
        self.flushes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn computations(&self) -> u64 {
        self.computations.load(Ordering::Relaxed)
    }

    pub fn compute_failures(&self) -> u64 {
        self.compute_failures.load(Ordering::Relaxed)
    }

    /// Get a point-in-time snapshot
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            hits: self.hits(),
            misses: self.misses(),
            coalesced: self.coalesced.load(Ordering::Relaxed),
            computations: self.computations(),
            compute_failures: self.compute_failures(),
            flushes: self.flushes.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time view of a cache's counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub coalesced: u64,
    pub computations: u64,
    pub compute_failures: u64,
    pub flushes: u64,
}

impl StatsSnapshot {
    /// Hit ratio over all fast-path lookups (0.0 - 1.0)
    pub fn hit_ratio(&self) -> f64 {
        let hits = self.hits as f64;
        let total = hits + self.misses as f64;
        if total == 0.0 {
            0.0
        } else {
            hits / total
        }
    }
}

impl std::fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "hits={} misses={} coalesced={} computations={} failures={} flushes={} hit_ratio={:.2}",
            self.hits,
            self.misses,
            self.coalesced,
            self.computations,
            self.compute_failures,
            self.flushes,
            self.hit_ratio()
        )
    }
}

// =============================================================================
// Tests
// =============================================================================
