//! Cache Catalog
//!
//! Every named cache the tool uses, built once per [`CacheContext`] and
//! registered for invalidation under a stable name.
//!
//! Names encode the grouping key of Set caches after a `#`, with key
//! components separated by `|` (e.g. `shimStage#server|arkStageId`).

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;
use tracing::info;

use crate::cache::{Invalidation, Registry, SetCache, SingularCache};
use crate::error::{Error, Result};
use crate::models::{shims, Activity, CliGameDataSeedResponse, Item, Notice, Stage, TimeRange, Zone};

// =============================================================================
// Keys
// =============================================================================

/// Key of `itemDropSet#server|stageId|rangeId`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StageRangeKey {
    pub server: String,
    pub stage_id: i64,
    pub range_id: i64,
}

/// Key of `itemDropSet#server|stageId|startTime|endTime`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StageTimeRangeKey {
    pub server: String,
    pub stage_id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// Key of `shimStage#server|arkStageId`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServerStageKey {
    pub server: String,
    pub ark_stage_id: String,
}

/// Accumulable time ranges, grouped by stage id then item id
pub type AccumulableTimeRanges = HashMap<i64, HashMap<i64, Vec<TimeRange>>>;

// =============================================================================
// Caches
// =============================================================================

/// All named caches of the tool
#[derive(Debug)]
pub struct Caches {
    // drop info
    pub item_drop_set_by_stage_id_and_range_id: Arc<SetCache<StageRangeKey, Vec<i64>>>,
    pub item_drop_set_by_stage_id_and_time_range: Arc<SetCache<StageTimeRangeKey, Vec<i64>>>,

    // item
    pub cli_game_data_seed: Arc<SingularCache<CliGameDataSeedResponse>>,
    pub item_by_ark_id: Arc<SetCache<String, Item>>,
    pub shim_items: Arc<SingularCache<Vec<shims::Item>>>,
    pub shim_item_by_ark_id: Arc<SetCache<String, shims::Item>>,
    pub items_map_by_id: Arc<SingularCache<HashMap<i64, Item>>>,
    pub items_map_by_ark_id: Arc<SingularCache<HashMap<String, Item>>>,

    // notice
    pub notices: Arc<SingularCache<Vec<Notice>>>,

    // activity
    pub activities: Arc<SingularCache<Vec<Activity>>>,
    pub shim_activities: Arc<SingularCache<Vec<shims::Activity>>>,

    // stage
    pub stages: Arc<SingularCache<Vec<Stage>>>,
    pub stage_by_ark_id: Arc<SetCache<String, Stage>>,
    pub shim_stages: Arc<SetCache<String, Vec<shims::Stage>>>,
    pub shim_stage_by_ark_id: Arc<SetCache<ServerStageKey, shims::Stage>>,
    pub stages_map_by_id: Arc<SingularCache<HashMap<i64, Stage>>>,
    pub stages_map_by_ark_id: Arc<SingularCache<HashMap<String, Stage>>>,

    // time range
    pub time_ranges: Arc<SetCache<String, Vec<TimeRange>>>,
    pub time_range_by_id: Arc<SetCache<i64, TimeRange>>,
    pub time_ranges_map: Arc<SetCache<String, HashMap<i64, TimeRange>>>,
    pub max_accumulable_time_ranges: Arc<SetCache<String, AccumulableTimeRanges>>,

    // zone
    pub zones: Arc<SingularCache<Vec<Zone>>>,
    pub zone_by_ark_id: Arc<SetCache<String, Zone>>,
    pub shim_zones: Arc<SingularCache<Vec<shims::Zone>>>,
    pub shim_zone_by_ark_id: Arc<SetCache<String, shims::Zone>>,
}

/// Build a Singular cache and register it under `name`
fn singular<T>(registry: &Registry, name: &str) -> Result<Arc<SingularCache<T>>>
where
    T: Send + Sync + 'static,
{
    singular_as(registry, name, name)
}

/// Build a Singular cache whose registry name differs from its cache name
fn singular_as<T>(
    registry: &Registry,
    cache_name: &str,
    registry_name: &str,
) -> Result<Arc<SingularCache<T>>>
where
    T: Send + Sync + 'static,
{
    let cache = Arc::new(SingularCache::new(cache_name));
    registry.register_singular(registry_name, Arc::clone(&cache))?;
    Ok(cache)
}

/// Build a Set cache and register it under `name`
fn set<K, T>(registry: &Registry, name: &str) -> Result<Arc<SetCache<K, T>>>
where
    K: Eq + std::hash::Hash + Send + Sync + 'static,
    T: Send + Sync + 'static,
{
    let cache = Arc::new(SetCache::new(name));
    registry.register_set(name, Arc::clone(&cache))?;
    Ok(cache)
}

impl Caches {
    /// Build every cache and register it in `registry`
    fn build(registry: &Registry) -> Result<Self> {
        let caches = Self {
            item_drop_set_by_stage_id_and_range_id: set(
                registry,
                "itemDropSet#server|stageId|rangeId",
            )?,
            item_drop_set_by_stage_id_and_time_range: set(
                registry,
                "itemDropSet#server|stageId|startTime|endTime",
            )?,

            // The seed is what operators call "items"
            cli_game_data_seed: singular_as(registry, "cliGameDataSeed", "items")?,
            item_by_ark_id: set(registry, "item#arkItemId")?,
            shim_items: singular(registry, "shimItems")?,
            shim_item_by_ark_id: set(registry, "shimItem#arkItemId")?,
            items_map_by_id: singular(registry, "itemsMapById")?,
            items_map_by_ark_id: singular(registry, "itemsMapByArkId")?,

            notices: singular(registry, "notices")?,

            activities: singular(registry, "activities")?,
            shim_activities: singular(registry, "shimActivities")?,

            stages: singular(registry, "stages")?,
            stage_by_ark_id: set(registry, "stage#arkStageId")?,
            shim_stages: set(registry, "shimStages#server")?,
            shim_stage_by_ark_id: set(registry, "shimStage#server|arkStageId")?,
            stages_map_by_id: singular(registry, "stagesMapById")?,
            stages_map_by_ark_id: singular(registry, "stagesMapByArkId")?,

            time_ranges: set(registry, "timeRanges#server")?,
            time_range_by_id: set(registry, "timeRange#rangeId")?,
            time_ranges_map: set(registry, "timeRangesMap#server")?,
            max_accumulable_time_ranges: set(registry, "maxAccumulableTimeRanges#server")?,

            zones: singular(registry, "zones")?,
            zone_by_ark_id: set(registry, "zone#arkZoneId")?,
            shim_zones: singular(registry, "shimZones")?,
            shim_zone_by_ark_id: set(registry, "shimZone#arkZoneId")?,
        };

        Ok(caches)
    }
}

// =============================================================================
// Context
// =============================================================================

/// Owner of the registry and the lazily-built catalog
///
/// Created once at the program's composition root and shared with every
/// collaborator that needs caching.
#[derive(Default)]
pub struct CacheContext {
    registry: Arc<Registry>,
    caches: OnceCell<Arc<Caches>>,
}

impl CacheContext {
    /// Create a context with an empty registry; nothing is built yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Build and register every cache exactly once
    ///
    /// Safe to call repeatedly and concurrently; every call returns the same
    /// catalog. Caches are registered into a staging registry first, so a
    /// failed build leaves the context's registry untouched.
    pub fn initialize(&self) -> Result<Arc<Caches>> {
        let caches = self.caches.get_or_try_init(|| {
            let staged = Registry::new();
            let caches = Caches::build(&staged)?;
            self.registry.absorb(staged)?;
            info!(caches = self.registry.len(), "cache catalog initialized");
            Ok::<_, Error>(Arc::new(caches))
        })?;
        Ok(Arc::clone(caches))
    }

    /// Catalog if already initialized
    pub fn caches(&self) -> Option<Arc<Caches>> {
        self.caches.get().cloned()
    }

    /// Invalidation registry
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Flush a cache by name, initializing the catalog first if needed
    pub fn invalidate(&self, name: &str, key_provided: bool) -> Result<Invalidation> {
        self.initialize()?;
        self.registry.invalidate(name, key_provided)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheKind;
    use std::thread;
    use std::time::Duration;

    const TTL: Duration = Duration::from_secs(60);

    #[test]
    fn test_initialize_registers_every_cache() {
        let ctx = CacheContext::new();
        assert!(ctx.caches().is_none());
        assert!(ctx.registry().is_empty());

        ctx.initialize().unwrap();
        assert_eq!(ctx.registry().len(), 25);
        assert_eq!(ctx.registry().kind_of("items"), Some(CacheKind::Singular));
        assert_eq!(ctx.registry().kind_of("cliGameDataSeed"), None);
        assert_eq!(
            ctx.registry().kind_of("itemDropSet#server|stageId|startTime|endTime"),
            Some(CacheKind::Set)
        );
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let ctx = CacheContext::new();
        let first = ctx.initialize().unwrap();
        let second = ctx.initialize().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(ctx.registry().len(), 25);
    }

    #[test]
    fn test_concurrent_initialize_builds_once() {
        let ctx = Arc::new(CacheContext::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ctx = Arc::clone(&ctx);
                thread::spawn(move || ctx.initialize().unwrap())
            })
            .collect();

        let catalogs: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for catalog in &catalogs[1..] {
            assert!(Arc::ptr_eq(&catalogs[0], catalog));
        }
        assert_eq!(ctx.registry().len(), 25);
    }

    #[test]
    fn test_seed_invalidated_as_items() {
        let ctx = CacheContext::new();
        let caches = ctx.initialize().unwrap();
        assert_eq!(caches.cli_game_data_seed.name(), "cliGameDataSeed");

        caches
            .cli_game_data_seed
            .set(CliGameDataSeedResponse::default(), TTL);
        assert_eq!(
            ctx.invalidate("items", false).unwrap(),
            Invalidation::Flushed(CacheKind::Singular)
        );
        assert!(caches.cli_game_data_seed.get().is_none());
    }

    #[test]
    fn test_set_cache_invalidated_with_key() {
        let ctx = CacheContext::new();
        let caches = ctx.initialize().unwrap();

        let key = ServerStageKey {
            server: "CN".to_string(),
            ark_stage_id: "main_01-07".to_string(),
        };
        let stage = shims::Stage {
            stage_id: 1,
            ark_stage_id: key.ark_stage_id.clone(),
            ark_zone_id: "main_1".to_string(),
            code: "1-7".to_string(),
            code_i18n: serde_json::Value::Null,
            sanity: Some(6),
            existence: serde_json::Value::Null,
        };
        caches.shim_stage_by_ark_id.set(key.clone(), stage, TTL);

        assert_eq!(
            ctx.invalidate("shimStage#server|arkStageId", true).unwrap(),
            Invalidation::Flushed(CacheKind::Set)
        );
        assert!(caches.shim_stage_by_ark_id.get(&key).is_none());
    }

    #[test]
    fn test_invalidate_before_initialize() {
        let ctx = CacheContext::new();
        assert_eq!(
            ctx.invalidate("zones", false).unwrap(),
            Invalidation::Flushed(CacheKind::Singular)
        );
        assert!(ctx.caches().is_some());
    }

    #[test]
    fn test_failed_initialize_registers_nothing() {
        let ctx = CacheContext::new();
        let taken = Arc::new(SingularCache::<u32>::new("zones"));
        ctx.registry().register_singular("zones", taken).unwrap();

        let err = ctx.initialize().unwrap_err();
        assert!(matches!(err, Error::DuplicateCacheName(ref name) if name == "zones"));
        assert_eq!(ctx.registry().len(), 1);
        assert!(ctx.caches().is_none());

        // Retrying reports the same clash, not a partially registered catalog
        let retry = ctx.initialize().unwrap_err();
        assert!(matches!(retry, Error::DuplicateCacheName(ref name) if name == "zones"));
        assert_eq!(ctx.registry().len(), 1);
    }

    #[test]
    fn test_contexts_are_isolated() {
        let a = CacheContext::new();
        let b = CacheContext::new();
        let caches_a = a.initialize().unwrap();
        let caches_b = b.initialize().unwrap();

        caches_a.notices.set(Vec::new(), TTL);
        b.invalidate("notices", false).unwrap();
        assert!(caches_a.notices.get().is_some());
        assert!(caches_b.notices.get().is_none());
    }
}
