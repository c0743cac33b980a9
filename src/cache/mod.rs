//! Named In-Process Cache
//!
//! TTL-expiring caches in two shapes plus a name-addressed invalidation
//! registry.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                            Registry                                   │
//! │        by_name_only (Singular)   │   by_name_with_key (Set)           │
//! ├──────────────────────────────────┼────────────────────────────────────┤
//! │  SingularCache<T>                │  SetCache<K, T>                    │
//! │  ┌────────────────┐              │  ┌──────────────────────────────┐  │
//! │  │ CacheEntry<T>  │              │  │ DashMap<K, Arc<CacheEntry>>  │  │
//! │  └────────────────┘              │  └──────────────────────────────┘  │
//! └──────────────────────────────────┴────────────────────────────────────┘
//! ```
//!
//! # Guarantees
//!
//! - A stale entry reads as empty
//! - At most one concurrent supplier per entry (`mutex_get_set*`)
//! - Failed suppliers are never cached
//! - Different caches and different keys never wait on each other's suppliers

mod entry;
mod metrics;
mod proptest;
mod registry;
mod set;
mod singular;

pub use entry::CacheEntry;
pub use metrics::{CacheStats, StatsSnapshot};
pub use registry::{CacheDescriptor, CacheKind, Flusher, Invalidation, Registry};
pub use set::SetCache;
pub use singular::SingularCache;
