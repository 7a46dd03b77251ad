//! Redis-backed shard hint cache.

use super::service::{CacheError, CacheResult, ShardHintCache};
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use tracing::{debug, info, warn};

/// Redis cache for per-family shard counts.
///
/// Uses connection pooling via `ConnectionManager` for efficient connection reuse.
/// All operations are fail-open: errors are logged but don't propagate to callers.
pub struct RedisCache {
    client: ConnectionManager,
    ttl_seconds: u64,
    key_prefix: String,
}

impl RedisCache {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// # Arguments
    ///
    /// - `redis_url` - Redis connection string (e.g., `"redis://localhost:6379"`)
    /// - `ttl_seconds` - lifetime of a cached hint; controlled via `SHARD_CACHE_TTL_SECONDS`
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ConnectionError`] if the URL is invalid, the connection cannot
    /// be established, or the PING health check fails.
    pub async fn connect(redis_url: &str, ttl_seconds: u64) -> CacheResult<Self> {
        info!("Connecting to Redis");

        let client = Client::open(redis_url).map_err(|e| {
            CacheError::ConnectionError(format!("Failed to create Redis client: {}", e))
        })?;

        let manager = ConnectionManager::new(client).await.map_err(|e| {
            CacheError::ConnectionError(format!("Failed to connect to Redis: {}", e))
        })?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| CacheError::ConnectionError(format!("Redis PING failed: {}", e)))?;

        info!("Connected to Redis");

        Ok(Self {
            client: manager,
            ttl_seconds,
            key_prefix: "shards:".to_string(),
        })
    }

    /// Constructs the full Redis key with namespace prefix.
    fn build_key(&self, domain: &str, suffix: &str) -> String {
        format!("{}{}.{}", self.key_prefix, domain, suffix)
    }
}

#[async_trait]
impl ShardHintCache for RedisCache {
    async fn get_shard_count(&self, domain: &str, suffix: &str) -> CacheResult<Option<u32>> {
        let key = self.build_key(domain, suffix);
        let mut conn = self.client.clone();

        match conn.get::<_, Option<u32>>(&key).await {
            Ok(Some(count)) => {
                debug!("Cache HIT: {} -> {} shards", key, count);
                Ok(Some(count))
            }
            Ok(None) => {
                debug!("Cache MISS: {}", key);
                Ok(None)
            }
            Err(e) => {
                warn!("Redis GET error for {}: {}", key, e);
                Ok(None)
            }
        }
    }

    async fn set_shard_count(&self, domain: &str, suffix: &str, count: u32) -> CacheResult<()> {
        let key = self.build_key(domain, suffix);
        let mut conn = self.client.clone();

        match conn
            .set_ex::<_, _, ()>(&key, count, self.ttl_seconds)
            .await
        {
            Ok(_) => {
                debug!("Cache SET: {} -> {} shards (TTL: {}s)", key, count, self.ttl_seconds);
                Ok(())
            }
            Err(e) => {
                warn!("Redis SET error for {}: {}", key, e);
                Ok(())
            }
        }
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }
}
