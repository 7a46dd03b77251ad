//! No-op hint cache for testing or disabled caching.

use super::service::{CacheResult, ShardHintCache};
use async_trait::async_trait;
use tracing::debug;

/// A cache implementation that does nothing.
///
/// Every lookup is a miss, so inserts always take the full shard scan.
pub struct NullCache;

impl NullCache {
    /// Creates a new NullCache instance.
    pub fn new() -> Self {
        debug!("Using NullCache (shard hints disabled)");
        Self
    }
}

impl Default for NullCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ShardHintCache for NullCache {
    async fn get_shard_count(&self, _domain: &str, _suffix: &str) -> CacheResult<Option<u32>> {
        Ok(None)
    }

    async fn set_shard_count(&self, _domain: &str, _suffix: &str, _count: u32) -> CacheResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }
}
