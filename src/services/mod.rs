//! Data-access services
//!
//! Services fetch game data through a [`GameDataSource`] and funnel every read
//! through the cache catalog.

mod item;

use async_trait::async_trait;

use crate::client::{AdminClient, GAME_DATA_SEED_PATH};
use crate::error::Result;
use crate::models::CliGameDataSeedResponse;

pub use item::ItemService;

/// Upstream source of game data
#[async_trait]
pub trait GameDataSource: Send + Sync {
    /// Fetch the game-data seed (the full item list)
    async fn fetch_game_data_seed(&self) -> Result<CliGameDataSeedResponse>;
}

#[async_trait]
impl GameDataSource for AdminClient {
    async fn fetch_game_data_seed(&self) -> Result<CliGameDataSeedResponse> {
        self.get_json(GAME_DATA_SEED_PATH).await
    }
}
