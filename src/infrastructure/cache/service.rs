//! Shard-count hint cache trait and error types.

use async_trait::async_trait;
use std::fmt;

/// Errors that can occur during cache operations.
#[derive(Debug)]
pub enum CacheError {
    ConnectionError(String),
    OperationError(String),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::ConnectionError(e) => write!(f, "Cache connection error: {}", e),
            Self::OperationError(e) => write!(f, "Cache operation error: {}", e),
        }
    }
}

impl std::error::Error for CacheError {}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Remembers how many shards a domain family was last seen to span.
///
/// The value is a hint only. Shards are never deleted, so a cached count is a
/// lower bound that may be stale; insert correctness never depends on it.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed hints with TTL
/// - [`crate::infrastructure::cache::NullCache`] - No-op implementation for disabled caching
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShardHintCache: Send + Sync {
    /// Returns the last known shard count of a family.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(count))` on cache hit
    /// - `Ok(None)` on cache miss or error (fail-open behavior)
    async fn get_shard_count(&self, domain: &str, suffix: &str) -> CacheResult<Option<u32>>;

    /// Records the shard count of a family.
    ///
    /// Implementations should log errors and return `Ok(())`.
    async fn set_shard_count(&self, domain: &str, suffix: &str, count: u32) -> CacheResult<()>;

    /// Checks if the cache backend is healthy.
    async fn health_check(&self) -> bool;
}
