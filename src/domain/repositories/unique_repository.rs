//! Repository trait for the uniqueness projections.

use async_trait::async_trait;

use crate::domain::entities::UniqueKind;
use crate::error::AppError;

/// Storage contract for the four presence-only projection collections.
///
/// Values are keyed by themselves; inserting an existing value is a no-op.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgUniqueRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::MemoryUniqueRepository`] - in-process store
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UniqueRepository: Send + Sync {
    /// Inserts every value not yet present. Returns how many were new.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StorageFailure`] on storage errors.
    async fn insert_many(&self, kind: UniqueKind, values: Vec<String>) -> Result<u64, AppError>;

    /// Number of values in the projection.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StorageFailure`] on storage errors.
    async fn count(&self, kind: UniqueKind) -> Result<i64, AppError>;
}
