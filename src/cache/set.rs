//! Set Cache
//!
//! A named cache keyed by an arbitrary value, e.g. items by ark id. Each key
//! owns an independent [`CacheEntry`]; populating, expiring or removing one key
//! never touches another.
//!
//! # Design
//!
//! - Key → entry map is a `DashMap`, so creating an entry for a new key only
//!   locks the shard holding that key, never the whole cache
//! - Population runs on the entry's own lock after the shard lock is released
//! - `flush` drops every entry; a supplier already running for a dropped entry
//!   writes into the orphaned entry and its result is not served

use std::borrow::Borrow;
use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tracing::{info, instrument};

use super::entry::CacheEntry;
use super::metrics::{CacheStats, StatsSnapshot};

/// Named keyed cache
pub struct SetCache<K, T> {
    name: String,
    entries: DashMap<K, Arc<CacheEntry<T>>>,
    stats: Arc<CacheStats>,
}

impl<K: Eq + Hash, T> SetCache<K, T> {
    /// Create an empty cache
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: DashMap::new(),
            stats: Arc::new(CacheStats::new()),
        }
    }

    /// Cache name used in logs and the registry
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of keys with an entry (fresh or stale)
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no key has an entry
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up an existing entry without creating one
    fn existing<Q>(&self, key: &Q) -> Option<Arc<CacheEntry<T>>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        // Clone the Arc so the shard guard is released before the entry is used
        self.entries.get(key).map(|entry| Arc::clone(entry.value()))
    }

    /// Get or create the entry for `key`
    fn entry(&self, key: K) -> Arc<CacheEntry<T>> {
        if let Some(entry) = self.existing(&key) {
            return entry;
        }
        self.entries
            .entry(key)
            .or_insert_with(|| Arc::new(CacheEntry::with_stats(Arc::clone(&self.stats))))
            .clone()
    }

    /// Store a value for `key`
    pub fn set(&self, key: K, value: T, ttl: Duration) {
        self.entry(key).write(value, ttl);
    }

    /// Drop the entry for a single key, returning whether it existed
    pub fn remove<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.remove(key).is_some()
    }

    /// Drop every key
    #[instrument(skip(self), fields(cache = %self.name))]
    pub fn flush(&self) {
        let dropped = self.entries.len();
        self.entries.clear();
        self.stats.record_flush();
        info!(dropped, "cache flushed");
    }

    /// Shared stats block
    pub(crate) fn stats_handle(&self) -> Arc<CacheStats> {
        Arc::clone(&self.stats)
    }

    /// Point-in-time counters, aggregated over all keys
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }
}

impl<K: Eq + Hash, T: Clone> SetCache<K, T> {
    /// Get the fresh value for `key`; unknown keys miss without creating an entry
    pub fn get<Q>(&self, key: &Q) -> Option<T>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.existing(key) {
            Some(entry) => entry.read(),
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    /// Get the value for `key`, computing it at most once among concurrent
    /// callers of the same key
    pub fn mutex_get_set<F, E>(&self, key: K, compute: F, ttl: Duration) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        self.entry(key).get_or_compute(compute, ttl)
    }

    /// Async flavour of [`SetCache::mutex_get_set`]
    pub async fn mutex_get_set_async<F, Fut, E>(
        &self,
        key: K,
        compute: F,
        ttl: Duration,
    ) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let entry = self.entry(key);
        entry.get_or_compute_async(compute, ttl).await
    }
}

impl<K: Eq + Hash, T> fmt::Debug for SetCache<K, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetCache")
            .field("name", &self.name)
            .field("keys", &self.entries.len())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;
    use std::thread;

    #[test]
    fn test_unknown_key_does_not_create_entry() {
        let cache: SetCache<String, u32> = SetCache::new("item#arkItemId");
        assert_eq!(cache.get("30012"), None);
        assert!(cache.is_empty());
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_set_and_get() {
        let cache = SetCache::new("zone#arkZoneId");
        cache.set("main_01".to_string(), 1u32, Duration::from_secs(60));
        cache.set("main_02".to_string(), 2u32, Duration::from_secs(60));

        assert_eq!(cache.get("main_01"), Some(1));
        assert_eq!(cache.get("main_02"), Some(2));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_key_isolation_on_expiry() {
        let cache = SetCache::new("timeRange#rangeId");
        cache.set(1i64, "short", Duration::from_millis(20));
        cache.set(2i64, "long", Duration::from_secs(60));

        thread::sleep(Duration::from_millis(40));
        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.get(&2), Some("long"));
    }

    #[test]
    fn test_remove_single_key() {
        let cache = SetCache::new("stage#arkStageId");
        cache.set("a".to_string(), 1u8, Duration::from_secs(60));
        cache.set("b".to_string(), 2u8, Duration::from_secs(60));

        assert!(cache.remove("a"));
        assert!(!cache.remove("a"));
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.get("b"), Some(2));
    }

    #[test]
    fn test_flush_clears_every_key() {
        let cache = SetCache::new("timeRanges#server");
        for server in ["CN", "US", "JP", "KR"] {
            cache.set(server.to_string(), vec![server.len()], Duration::from_secs(60));
        }

        cache.flush();
        assert!(cache.is_empty());
        for server in ["CN", "US", "JP", "KR"] {
            assert_eq!(cache.get(server), None);
        }
        assert_eq!(cache.stats().flushes, 1);
    }

    #[test]
    fn test_mutex_get_set_per_key() {
        let cache = SetCache::new("shimStages#server");
        let calls = AtomicUsize::new(0);
        let compute = |v: u32| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, ()>(v)
        };

        assert_eq!(cache.mutex_get_set("CN", || compute(1), Duration::from_secs(60)), Ok(1));
        assert_eq!(cache.mutex_get_set("CN", || compute(9), Duration::from_secs(60)), Ok(1));
        assert_eq!(cache.mutex_get_set("US", || compute(2), Duration::from_secs(60)), Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_failure_on_one_key_leaves_other_cached() {
        let cache = SetCache::new("item#arkItemId");
        cache.set("ok", 1u8, Duration::from_secs(60));

        let failed: Result<u8, &str> = cache.mutex_get_set("bad", || Err("nope"), Duration::from_secs(60));
        assert_eq!(failed, Err("nope"));
        assert_eq!(cache.get("bad"), None);
        assert_eq!(cache.get("ok"), Some(1));
    }

    #[test]
    fn test_concurrent_distinct_keys_do_not_serialize() {
        const KEYS: usize = 8;

        let cache = Arc::new(SetCache::new("shimZone#arkZoneId"));
        let barrier = Arc::new(Barrier::new(KEYS));
        let started = std::time::Instant::now();

        let handles: Vec<_> = (0..KEYS)
            .map(|key| {
                let cache = Arc::clone(&cache);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    cache.mutex_get_set(
                        key,
                        || -> Result<usize, ()> {
                            thread::sleep(Duration::from_millis(100));
                            Ok(key * 10)
                        },
                        Duration::from_secs(60),
                    )
                })
            })
            .collect();

        for (key, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.join().unwrap(), Ok(key * 10));
        }

        // Serialized population would take KEYS * 100ms
        assert!(started.elapsed() < Duration::from_millis(100 * KEYS as u64 / 2));
        assert_eq!(cache.stats().computations, KEYS as u64);
    }

    #[test]
    fn test_concurrent_same_key_computes_once() {
        const CALLERS: usize = 12;

        let cache = Arc::new(SetCache::new("itemDropSet#server|stageId|rangeId"));
        let calls = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(CALLERS));

        let handles: Vec<_> = (0..CALLERS)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let calls = Arc::clone(&calls);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    cache.mutex_get_set(
                        ("CN".to_string(), 1i64, 2i64),
                        || -> Result<Vec<i64>, ()> {
                            calls.fetch_add(1, Ordering::SeqCst);
                            thread::sleep(Duration::from_millis(30));
                            Ok(vec![30012, 30013])
                        },
                        Duration::from_secs(60),
                    )
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), Ok(vec![30012, 30013]));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_mutex_get_set_async() {
        let cache = SetCache::new("shimItem#arkItemId");
        let value = cache
            .mutex_get_set_async("30012".to_string(), || async { Ok::<_, ()>(5u32) }, Duration::from_secs(5))
            .await;
        assert_eq!(value, Ok(5));
        assert_eq!(cache.get("30012"), Some(5));
    }

    #[tokio::test]
    async fn test_mutex_get_set_inside_runtime() {
        let cache = SetCache::new("timeRangesMap#server");
        let value = cache.mutex_get_set("CN".to_string(), || Ok::<_, ()>(7u32), Duration::from_secs(5));
        assert_eq!(value, Ok(7));
        assert_eq!(cache.get("CN"), Some(7));
    }

    #[test]
    fn test_debug_output() {
        let cache = SetCache::new("zone#arkZoneId");
        cache.set("main_01".to_string(), 1u32, Duration::from_secs(60));

        let debug = format!("{:?}", cache);
        assert!(debug.contains("zone#arkZoneId"));
        assert!(debug.contains("keys: 1"));
    }
}
