//! Repository trait for the sharded label store.

use std::collections::BTreeSet;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::domain::entities::{ShardDocument, ShardKey};
use crate::error::AppError;

/// Result of an add-to-set upsert against a single shard document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelUpsert {
    /// The shard document did not exist and was created holding the label.
    Created,
    /// The label was appended to an existing shard.
    Added,
    /// The shard already held the label; nothing changed.
    AlreadyPresent,
    /// Adding the label would push the document over the size cap.
    /// Control-flow signal for the caller to try the next shard.
    ShardFull,
}

/// Storage contract for shard documents.
///
/// Implementations must provide:
/// - atomic single-document add-to-set upserts, keyed by [`ShardKey`]
/// - a unique `(domain, suffix, shard)` constraint so concurrent creation of the
///   same shard collapses into one document
/// - streaming reads that never materialize the whole result set
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgShardRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::MemoryShardRepository`] - in-process store
///
/// # Examples
///
/// See integration tests: `tests/repository_shard.rs`
#[async_trait]
pub trait ShardRepository: Send + Sync {
    /// Adds `label` to the shard identified by `key`, creating the shard if absent.
    ///
    /// Returns [`LabelUpsert::ShardFull`] instead of an error when the resulting
    /// document would exceed `max_document_size` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StorageFailure`] on any other storage error.
    async fn add_label(
        &self,
        key: &ShardKey,
        label: &str,
        max_document_size: u64,
    ) -> Result<LabelUpsert, AppError>;

    /// Finds the shard of a family that holds `label`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StorageFailure`] on storage errors.
    async fn find_label_shard(
        &self,
        domain: &str,
        suffix: &str,
        label: &str,
    ) -> Result<Option<u32>, AppError>;

    /// Streams every shard of a `(domain, suffix)` family, ordered by shard index.
    fn family(&self, domain: &str, suffix: &str) -> BoxStream<'_, Result<ShardDocument, AppError>>;

    /// Streams every shard document in the store, in no particular order.
    ///
    /// Callers may write to the store while consuming the stream.
    fn scan(&self) -> BoxStream<'_, Result<ShardDocument, AppError>>;

    /// Distinct suffixes recorded for a second-level name.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StorageFailure`] on storage errors.
    async fn find_suffixes(&self, domain: &str) -> Result<BTreeSet<String>, AppError>;

    /// Number of shard documents in a family.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StorageFailure`] on storage errors.
    async fn count_family(&self, domain: &str, suffix: &str) -> Result<i64, AppError>;

    /// Total number of shard documents.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StorageFailure`] on storage errors.
    async fn count_documents(&self) -> Result<i64, AppError>;

    /// Checks that the store is reachable.
    async fn health_check(&self) -> bool;
}
