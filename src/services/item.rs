//! Item Service
//!
//! Item lookups backed by the game-data seed. The seed itself is cached with a
//! plain get-then-set; the maps and single-item lookups derived from it go
//! through the stampede-safe `mutex_get_set_async`.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, instrument};

use super::GameDataSource;
use crate::catalog::Caches;
use crate::config::CacheTtls;
use crate::error::{Error, Result};
use crate::models::Item;

/// Item lookups with caching
pub struct ItemService {
    source: Arc<dyn GameDataSource>,
    caches: Arc<Caches>,
    ttls: CacheTtls,
}

impl ItemService {
    /// Create a service with default TTLs
    pub fn new(source: Arc<dyn GameDataSource>, caches: Arc<Caches>) -> Self {
        Self::with_ttls(source, caches, CacheTtls::default())
    }

    /// Create a service with custom TTLs
    pub fn with_ttls(source: Arc<dyn GameDataSource>, caches: Arc<Caches>, ttls: CacheTtls) -> Self {
        Self {
            source,
            caches,
            ttls,
        }
    }

    /// Every item in the game-data seed
    #[instrument(skip(self))]
    pub async fn get_items(&self) -> Result<Vec<Item>> {
        if let Some(seed) = self.caches.cli_game_data_seed.get() {
            return Ok(seed.items);
        }

        let seed = self.source.fetch_game_data_seed().await?;
        debug!(items = seed.items.len(), "fetched game-data seed");
        let items = seed.items.clone();
        self.caches
            .cli_game_data_seed
            .set(seed, self.ttls.game_data_seed);
        Ok(items)
    }

    /// Items keyed by ark item id
    #[instrument(skip(self))]
    pub async fn get_items_map_by_ark_id(&self) -> Result<HashMap<String, Item>> {
        self.caches
            .items_map_by_ark_id
            .mutex_get_set_async(
                || async {
                    let items = self.get_items().await?;
                    Ok::<_, Error>(
                        items
                            .into_iter()
                            .map(|item| (item.ark_item_id.clone(), item))
                            .collect(),
                    )
                },
                self.ttls.items_map,
            )
            .await
    }

    /// Items keyed by numeric item id
    #[instrument(skip(self))]
    pub async fn get_items_map_by_id(&self) -> Result<HashMap<i64, Item>> {
        self.caches
            .items_map_by_id
            .mutex_get_set_async(
                || async {
                    let items = self.get_items().await?;
                    Ok::<_, Error>(items.into_iter().map(|item| (item.item_id, item)).collect())
                },
                self.ttls.items_map,
            )
            .await
    }

    /// A single item by ark item id
    ///
    /// Unknown ids fail with [`Error::ItemNotFound`]; the failure is not cached.
    #[instrument(skip(self))]
    pub async fn get_item_by_ark_id(&self, ark_item_id: &str) -> Result<Item> {
        self.caches
            .item_by_ark_id
            .mutex_get_set_async(
                ark_item_id.to_string(),
                || async {
                    let items = self.get_items_map_by_ark_id().await?;
                    items
                        .get(ark_item_id)
                        .cloned()
                        .ok_or_else(|| Error::ItemNotFound(ark_item_id.to_string()))
                },
                self.ttls.item,
            )
            .await
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CacheContext;
    use crate::models::CliGameDataSeedResponse;
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeSource {
        calls: AtomicUsize,
        items: Vec<Item>,
    }

    impl FakeSource {
        fn new(ark_ids: &[&str]) -> Self {
            let items = ark_ids
                .iter()
                .enumerate()
                .map(|(i, ark_id)| Item {
                    item_id: i as i64 + 1,
                    ark_item_id: ark_id.to_string(),
                    name: serde_json::Value::Null,
                    existence: serde_json::Value::Null,
                    item_type: "MATERIAL".to_string(),
                    sort_id: i as i64,
                    rarity: 0,
                    group_id: None,
                    sprite: None,
                    keywords: serde_json::Value::Null,
                })
                .collect();
            Self {
                calls: AtomicUsize::new(0),
                items,
            }
        }
    }

    #[async_trait]
    impl GameDataSource for FakeSource {
        async fn fetch_game_data_seed(&self) -> Result<CliGameDataSeedResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(CliGameDataSeedResponse {
                items: self.items.clone(),
            })
        }
    }

    fn service(source: Arc<FakeSource>) -> (CacheContext, ItemService) {
        let ctx = CacheContext::new();
        let caches = ctx.initialize().unwrap();
        (ctx, ItemService::new(source, caches))
    }

    #[tokio::test]
    async fn test_get_items_caches_seed() {
        let source = Arc::new(FakeSource::new(&["30011", "30012"]));
        let (_ctx, items) = service(Arc::clone(&source));

        assert_eq!(items.get_items().await.unwrap().len(), 2);
        assert_eq!(items.get_items().await.unwrap().len(), 2);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_maps_derived_from_one_fetch() {
        let source = Arc::new(FakeSource::new(&["30011", "30012", "30013"]));
        let (_ctx, items) = service(Arc::clone(&source));

        let by_ark_id = items.get_items_map_by_ark_id().await.unwrap();
        let by_id = items.get_items_map_by_id().await.unwrap();

        assert_eq!(by_ark_id["30012"].item_id, 2);
        assert_eq!(by_id[&3].ark_item_id, "30013");
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_get_item_by_ark_id() {
        let source = Arc::new(FakeSource::new(&["30011"]));
        let (_ctx, items) = service(source);

        let item = items.get_item_by_ark_id("30011").await.unwrap();
        assert_eq!(item.item_id, 1);

        let err = items.get_item_by_ark_id("99999").await.unwrap_err();
        assert_matches!(err, Error::ItemNotFound(ref id) if id == "99999");
    }

    #[tokio::test]
    async fn test_invalidating_items_forces_refetch() {
        let source = Arc::new(FakeSource::new(&["30011"]));
        let (ctx, items) = service(Arc::clone(&source));

        items.get_items().await.unwrap();
        ctx.invalidate("items", false).unwrap();
        items.get_items().await.unwrap();

        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }
}
