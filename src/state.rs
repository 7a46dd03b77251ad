//! Shared application state injected into every handler.

use std::sync::Arc;

use crate::application::services::{ProjectorService, ShardService, StatsService, StoreLimits};
use crate::domain::repositories::{ShardRepository, UniqueRepository};
use crate::infrastructure::cache::ShardHintCache;

pub type DynShardService = ShardService<dyn ShardRepository>;
pub type DynProjectorService = ProjectorService<dyn ShardRepository, dyn UniqueRepository>;
pub type DynStatsService = StatsService<dyn ShardRepository, dyn UniqueRepository>;

/// Services behind trait objects so the storage backend is picked at runtime.
#[derive(Clone)]
pub struct AppState {
    pub shard_service: Arc<DynShardService>,
    pub projector_service: Arc<DynProjectorService>,
    pub stats_service: Arc<DynStatsService>,
    pub cache: Arc<dyn ShardHintCache>,
}

impl AppState {
    /// Wires every service on top of one shard store and one projection store.
    pub fn new(
        shards: Arc<dyn ShardRepository>,
        uniques: Arc<dyn UniqueRepository>,
        cache: Arc<dyn ShardHintCache>,
        limits: StoreLimits,
    ) -> Self {
        Self {
            shard_service: Arc::new(ShardService::new(shards.clone(), cache.clone(), limits)),
            projector_service: Arc::new(ProjectorService::new(
                shards.clone(),
                uniques.clone(),
                limits.timeout,
            )),
            stats_service: Arc::new(StatsService::new(shards, uniques, limits.timeout)),
            cache,
        }
    }
}
