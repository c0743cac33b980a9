//! Cache Entry Core
//!
//! Generic expiring value box. An entry is either empty or holds a value that
//! is fresh until its expiry instant; a stale entry reads exactly like an
//! empty one.
//!
//! # Population
//!
//! `get_or_compute` and `get_or_compute_async` share one per-entry population
//! lock. Readers never touch it, and callers racing on a populated entry never
//! block. Among callers racing on an empty or stale entry the supplier runs at
//! most once per successful population; a failed supplier leaves the entry
//! empty so the next caller retries.
//!
//! The sync flavour is safe to call from a runtime thread: on a multi-thread
//! runtime it waits inside `block_in_place`, and on a current-thread runtime a
//! contended lock is skipped rather than waited on.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, error, trace, warn};

use super::metrics::CacheStats;

#[derive(Debug, Clone)]
struct Slot<T> {
    value: T,
    expires_at: Instant,
}

impl<T> Slot<T> {
    #[inline]
    fn is_fresh(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Expiring value box with a population guard
pub struct CacheEntry<T> {
    /// Value and expiry, replaced atomically on write
    slot: RwLock<Option<Slot<T>>>,
    /// Serializes suppliers; held across `.await` by async callers
    population_lock: Mutex<()>,
    stats: Arc<CacheStats>,
}

impl<T> CacheEntry<T> {
    /// Create an empty entry with its own stats block
    pub fn new() -> Self {
        Self::with_stats(Arc::new(CacheStats::new()))
    }

    /// Create an empty entry reporting into a shared stats block
    pub fn with_stats(stats: Arc<CacheStats>) -> Self {
        Self {
            slot: RwLock::new(None),
            population_lock: Mutex::new(()),
            stats,
        }
    }

    /// Reset to empty regardless of freshness
    ///
    /// A supplier already running under the population lock still writes its
    /// result once it returns.
    pub fn clear(&self) {
        *self.slot.write() = None;
    }

    /// Whether the entry currently holds a fresh value
    pub fn is_fresh(&self) -> bool {
        let now = Instant::now();
        self.slot
            .read()
            .as_ref()
            .is_some_and(|slot| slot.is_fresh(now))
    }

    /// Expiry instant of the stored value, if any (stale values included)
    pub fn expires_at(&self) -> Option<Instant> {
        self.slot.read().as_ref().map(|slot| slot.expires_at)
    }

    /// Stats block this entry reports into
    pub fn stats(&self) -> &Arc<CacheStats> {
        &self.stats
    }

    /// Store `value` until `now + ttl`
    ///
    /// A zero TTL is a programming error: it panics in debug builds, and in
    /// release builds the write is dropped so a pre-expired value is never
    /// cached.
    pub fn write(&self, value: T, ttl: Duration) {
        debug_assert!(!ttl.is_zero(), "cache TTL must be positive");
        if ttl.is_zero() {
            error!("refusing to cache a value with a zero TTL");
            return;
        }

        let Some(expires_at) = Instant::now().checked_add(ttl) else {
            error!(ttl_secs = ttl.as_secs(), "cache TTL overflows the clock");
            return;
        };

        *self.slot.write() = Some(Slot { value, expires_at });
    }
}

impl<T: Clone> CacheEntry<T> {
    /// Read the value if it is fresh. Never blocks on population.
    pub fn read(&self) -> Option<T> {
        match self.peek() {
            Some(value) => {
                self.stats.record_hit();
                Some(value)
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    /// Freshness-checked read without touching the counters
    fn peek(&self) -> Option<T> {
        let now = Instant::now();
        let guard = self.slot.read();
        guard
            .as_ref()
            .filter(|slot| slot.is_fresh(now))
            .map(|slot| slot.value.clone())
    }

    /// Return the fresh value, or run `compute` once and cache its result
    ///
    /// Blocks the calling thread while another caller populates the entry.
    /// On a multi-thread runtime worker the wait goes through
    /// [`tokio::task::block_in_place`]. On a current-thread runtime a contended
    /// lock cannot be waited for without stalling its holder, so `compute` runs
    /// unguarded; prefer [`CacheEntry::get_or_compute_async`] there.
    pub fn get_or_compute<F, E>(&self, compute: F, ttl: Duration) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        if let Some(value) = self.read() {
            return Ok(value);
        }

        let _guard = self.lock_blocking();

        // Another caller may have written while we waited
        if let Some(value) = self.peek() {
            self.stats.record_coalesced();
            trace!("entry populated while waiting");
            return Ok(value);
        }

        self.settle(compute(), ttl)
    }

    /// Async flavour of [`CacheEntry::get_or_compute`]
    ///
    /// The population lock is held across the supplier's `.await`, so waiters
    /// are suspended rather than blocked.
    pub async fn get_or_compute_async<F, Fut, E>(&self, compute: F, ttl: Duration) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(value) = self.read() {
            return Ok(value);
        }

        let _guard = self.population_lock.lock().await;

        if let Some(value) = self.peek() {
            self.stats.record_coalesced();
            trace!("entry populated while waiting");
            return Ok(value);
        }

        let outcome = compute().await;
        self.settle(outcome, ttl)
    }

    /// Acquire the population lock from synchronous code
    fn lock_blocking(&self) -> Option<MutexGuard<'_, ()>> {
        if let Ok(guard) = self.population_lock.try_lock() {
            return Some(guard);
        }

        match Handle::try_current() {
            Err(_) => Some(self.population_lock.blocking_lock()),
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::CurrentThread => {
                warn!("population lock contended on a current-thread runtime, computing unguarded");
                None
            }
            Ok(_) => Some(tokio::task::block_in_place(|| {
                self.population_lock.blocking_lock()
            })),
        }
    }

    /// Write a successful outcome; leave the entry untouched on failure
    fn settle<E>(&self, outcome: Result<T, E>, ttl: Duration) -> Result<T, E> {
        match outcome {
            Ok(value) => {
                self.stats.record_computation();
                self.write(value.clone(), ttl);
                debug!(ttl_ms = ttl.as_millis() as u64, "entry populated");
                Ok(value)
            }
            Err(e) => {
                self.stats.record_compute_failure();
                debug!("entry population failed, not caching");
                Err(e)
            }
        }
    }
}

impl<T> Default for CacheEntry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for CacheEntry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheEntry")
            .field("fresh", &self.is_fresh())
            .field("expires_at", &self.expires_at())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
