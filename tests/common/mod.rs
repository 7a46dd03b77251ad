#![allow(dead_code)]

use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use subdomain_registry::application::services::StoreLimits;
use subdomain_registry::domain::entities::ShardDocument;
use subdomain_registry::infrastructure::cache::NullCache;
use subdomain_registry::infrastructure::persistence::{
    MemoryShardRepository, MemoryUniqueRepository, PgShardRepository, PgUniqueRepository,
};
use subdomain_registry::state::AppState;

/// Cap that holds exactly one label of `len` bytes per shard of `domain.suffix`.
pub fn one_label_cap(domain: &str, suffix: &str, len: usize) -> u64 {
    ShardDocument::base_size(domain, suffix) + ShardDocument::entry_size(&"x".repeat(len))
}

pub fn limits(max_document_size: u64) -> StoreLimits {
    StoreLimits {
        max_document_size,
        timeout: Duration::from_secs(5),
    }
}

/// Handles on the in-memory stores behind a test state.
pub struct MemoryStores {
    pub shards: Arc<MemoryShardRepository>,
    pub uniques: Arc<MemoryUniqueRepository>,
}

pub fn create_memory_state(max_document_size: u64) -> (AppState, MemoryStores) {
    let shards = Arc::new(MemoryShardRepository::new());
    let uniques = Arc::new(MemoryUniqueRepository::new());

    let state = AppState::new(
        shards.clone(),
        uniques.clone(),
        Arc::new(NullCache::new()),
        limits(max_document_size),
    );

    (state, MemoryStores { shards, uniques })
}

pub fn create_test_state() -> AppState {
    create_memory_state(16 * 1024 * 1024).0
}

pub fn create_pg_state(pool: PgPool, max_document_size: u64) -> AppState {
    let pool = Arc::new(pool);

    AppState::new(
        Arc::new(PgShardRepository::new(pool.clone())),
        Arc::new(PgUniqueRepository::new(pool)),
        Arc::new(NullCache::new()),
        limits(max_document_size),
    )
}

pub async fn insert_all(state: &AppState, hostnames: &[&str]) {
    for hostname in hostnames {
        state.shard_service.insert(hostname).await.unwrap();
    }
}
