//! Invalidation Registry
//!
//! Maps a cache name to the function that flushes it, so an operator can
//! invalidate a cache by name without holding a typed handle.
//!
//! Singular caches live in the `by_name_only` table and Set caches in the
//! `by_name_with_key` table. Names are unique across both tables.
//!
//! # Lookup
//!
//! | key provided | tables searched                             |
//! |--------------|---------------------------------------------|
//! | yes          | `by_name_with_key`                          |
//! | no           | `by_name_only`, then `by_name_with_key`     |
//!
//! A name found in neither table is a soft no-op reported as
//! [`Invalidation::NotFound`].

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{info, warn};

use super::metrics::{CacheStats, StatsSnapshot};
use super::set::SetCache;
use super::singular::SingularCache;
use crate::error::{Error, Result};

/// Flush function stored in the registry
pub type Flusher = Arc<dyn Fn() -> Result<()> + Send + Sync>;

/// Shape of a registered cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKind {
    /// One value, flushed by clearing the slot
    Singular,
    /// Keyed values, flushed by dropping every key
    Set,
}

impl fmt::Display for CacheKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKind::Singular => write!(f, "singular"),
            CacheKind::Set => write!(f, "set"),
        }
    }
}

/// Result of an invalidation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invalidation {
    /// The named cache was flushed
    Flushed(CacheKind),
    /// No cache matched the name and key-presence combination
    NotFound,
}

#[derive(Clone)]
struct Registration {
    flush: Flusher,
    stats: Arc<CacheStats>,
}

/// Registered cache as reported by [`Registry::describe`]
#[derive(Debug, Clone, PartialEq)]
pub struct CacheDescriptor {
    pub name: String,
    pub kind: CacheKind,
    pub stats: StatsSnapshot,
}

/// Name-addressed flush table
#[derive(Default)]
pub struct Registry {
    by_name_only: RwLock<HashMap<String, Registration>>,
    by_name_with_key: RwLock<HashMap<String, Registration>>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a flush function under `name`
    ///
    /// Fails with [`Error::DuplicateCacheName`] if `name` is already taken in
    /// either table.
    pub fn register(
        &self,
        name: impl Into<String>,
        kind: CacheKind,
        flush: Flusher,
        stats: Arc<CacheStats>,
    ) -> Result<()> {
        let name = name.into();

        // Fixed lock order: name-only before with-key
        let mut by_name_only = self.by_name_only.write();
        let mut by_name_with_key = self.by_name_with_key.write();

        if by_name_only.contains_key(&name) || by_name_with_key.contains_key(&name) {
            return Err(Error::DuplicateCacheName(name));
        }

        let table = match kind {
            CacheKind::Singular => &mut *by_name_only,
            CacheKind::Set => &mut *by_name_with_key,
        };
        table.insert(name, Registration { flush, stats });
        Ok(())
    }

    /// Register a Singular cache; its flush function is [`SingularCache::delete`]
    pub fn register_singular<T>(&self, name: &str, cache: Arc<SingularCache<T>>) -> Result<()>
    where
        T: Send + Sync + 'static,
    {
        let stats = cache.stats_handle();
        let flush: Flusher = Arc::new(move || {
            cache.delete();
            Ok(())
        });
        self.register(name, CacheKind::Singular, flush, stats)
    }

    /// Register a Set cache; its flush function is [`SetCache::flush`]
    pub fn register_set<K, T>(&self, name: &str, cache: Arc<SetCache<K, T>>) -> Result<()>
    where
        K: Eq + Hash + Send + Sync + 'static,
        T: Send + Sync + 'static,
    {
        let stats = cache.stats_handle();
        let flush: Flusher = Arc::new(move || {
            cache.flush();
            Ok(())
        });
        self.register(name, CacheKind::Set, flush, stats)
    }

    /// Move every registration of `staged` into this registry
    ///
    /// All or nothing: if any staged name is already taken, nothing is moved
    /// and [`Error::DuplicateCacheName`] is returned.
    pub fn absorb(&self, staged: Registry) -> Result<()> {
        let incoming_name_only = staged.by_name_only.into_inner();
        let incoming_with_key = staged.by_name_with_key.into_inner();

        let mut by_name_only = self.by_name_only.write();
        let mut by_name_with_key = self.by_name_with_key.write();

        let clash = incoming_name_only
            .keys()
            .chain(incoming_with_key.keys())
            .find(|name| by_name_only.contains_key(*name) || by_name_with_key.contains_key(*name));
        if let Some(name) = clash {
            return Err(Error::DuplicateCacheName(name.clone()));
        }

        by_name_only.extend(incoming_name_only);
        by_name_with_key.extend(incoming_with_key);
        Ok(())
    }

    fn lookup(&self, name: &str, kind: CacheKind) -> Option<Flusher> {
        let table = match kind {
            CacheKind::Singular => self.by_name_only.read(),
            CacheKind::Set => self.by_name_with_key.read(),
        };
        table.get(name).map(|registration| Arc::clone(&registration.flush))
    }

    /// Flush the cache registered under `name`
    ///
    /// `key_provided` mirrors whether the operator qualified the request with
    /// a key. The flush function runs after the table lock is released; its
    /// error is propagated.
    pub fn invalidate(&self, name: &str, key_provided: bool) -> Result<Invalidation> {
        let found = if key_provided {
            self.lookup(name, CacheKind::Set).map(|f| (CacheKind::Set, f))
        } else {
            self.lookup(name, CacheKind::Singular)
                .map(|f| (CacheKind::Singular, f))
                .or_else(|| self.lookup(name, CacheKind::Set).map(|f| (CacheKind::Set, f)))
        };

        let Some((kind, flush)) = found else {
            warn!(cache = name, key_provided, "no cache registered under this name");
            return Ok(Invalidation::NotFound);
        };

        flush()?;
        info!(cache = name, %kind, "cache invalidated");
        Ok(Invalidation::Flushed(kind))
    }

    /// Kind of the cache registered under `name`
    pub fn kind_of(&self, name: &str) -> Option<CacheKind> {
        if self.by_name_only.read().contains_key(name) {
            Some(CacheKind::Singular)
        } else if self.by_name_with_key.read().contains_key(name) {
            Some(CacheKind::Set)
        } else {
            None
        }
    }

    /// Number of registered caches
    pub fn len(&self) -> usize {
        self.by_name_only.read().len() + self.by_name_with_key.read().len()
    }

    /// Check if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every registered cache with its counters, sorted by name
    pub fn describe(&self) -> Vec<CacheDescriptor> {
        let mut descriptors: Vec<CacheDescriptor> = Vec::with_capacity(self.len());

        for (kind, table) in [
            (CacheKind::Singular, &self.by_name_only),
            (CacheKind::Set, &self.by_name_with_key),
        ] {
            descriptors.extend(table.read().iter().map(|(name, registration)| CacheDescriptor {
                name: name.clone(),
                kind,
                stats: registration.stats.snapshot(),
            }));
        }

        descriptors.sort_by(|a, b| a.name.cmp(&b.name));
        descriptors
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("by_name_only", &self.by_name_only.read().len())
            .field("by_name_with_key", &self.by_name_with_key.read().len())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
