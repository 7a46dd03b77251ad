//! Aggregate counts over the shard store and the uniqueness projections.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::within;
use crate::domain::entities::UniqueKind;
use crate::domain::repositories::{ShardRepository, UniqueRepository};
use crate::error::AppError;

/// Snapshot of store sizes.
///
/// `total_documents` counts shard documents, which is a rough proxy for the
/// number of domains: one popular domain may span several shards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsReport {
    pub total_documents: i64,
    pub unique_tlds: i64,
    pub unique_domains: i64,
    pub unique_full_domains: i64,
    pub unique_subs: i64,
    pub generated_at: DateTime<Utc>,
}

/// Read-only service reporting collection sizes.
pub struct StatsService<S: ShardRepository + ?Sized, U: UniqueRepository + ?Sized> {
    shards: Arc<S>,
    uniques: Arc<U>,
    timeout: Duration,
}

impl<S, U> StatsService<S, U>
where
    S: ShardRepository + ?Sized,
    U: UniqueRepository + ?Sized,
{
    /// Creates a new statistics service.
    pub fn new(shards: Arc<S>, uniques: Arc<U>, timeout: Duration) -> Self {
        Self {
            shards,
            uniques,
            timeout,
        }
    }

    /// Counts every collection. The five counts are queried concurrently.
    ///
    /// # Errors
    ///
    /// Returns the first [`AppError::StorageFailure`] or [`AppError::Timeout`];
    /// no partial report is produced.
    pub async fn report(&self) -> Result<StatsReport, AppError> {
        let (total_documents, unique_tlds, unique_domains, unique_full_domains, unique_subs) =
            futures::try_join!(
                within(self.timeout, "count_documents", self.shards.count_documents()),
                self.count(UniqueKind::Tld),
                self.count(UniqueKind::Domain),
                self.count(UniqueKind::FullDomain),
                self.count(UniqueKind::Sub),
            )?;

        Ok(StatsReport {
            total_documents,
            unique_tlds,
            unique_domains,
            unique_full_domains,
            unique_subs,
            generated_at: Utc::now(),
        })
    }

    async fn count(&self, kind: UniqueKind) -> Result<i64, AppError> {
        within(self.timeout, "count_unique", self.uniques.count(kind)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::ShardKey;
    use crate::domain::repositories::MockUniqueRepository;
    use crate::infrastructure::persistence::{MemoryShardRepository, MemoryUniqueRepository};
    use serde_json::json;

    #[tokio::test]
    async fn test_report_counts_every_collection() {
        let shards = Arc::new(MemoryShardRepository::new());
        shards
            .add_label(&ShardKey::new("example", "com", 0), "www", u64::MAX)
            .await
            .unwrap();
        shards
            .add_label(&ShardKey::new("example", "com", 1), "api", u64::MAX)
            .await
            .unwrap();

        let uniques = Arc::new(MemoryUniqueRepository::new());
        uniques
            .insert_many(UniqueKind::Sub, vec!["www".into(), "api".into()])
            .await
            .unwrap();
        uniques
            .insert_many(UniqueKind::Tld, vec!["com".into()])
            .await
            .unwrap();

        let report = StatsService::new(shards, uniques, Duration::from_secs(5))
            .report()
            .await
            .unwrap();

        assert_eq!(report.total_documents, 2);
        assert_eq!(report.unique_tlds, 1);
        assert_eq!(report.unique_domains, 0);
        assert_eq!(report.unique_full_domains, 0);
        assert_eq!(report.unique_subs, 2);
    }

    #[tokio::test]
    async fn test_report_fails_when_any_count_fails() {
        let mut uniques = MockUniqueRepository::new();
        uniques.expect_count().returning(|kind| match kind {
            UniqueKind::FullDomain => Err(AppError::storage("count failed", json!({}))),
            _ => Ok(1),
        });

        let result = StatsService::new(
            Arc::new(MemoryShardRepository::new()),
            Arc::new(uniques),
            Duration::from_secs(5),
        )
        .report()
        .await;

        assert!(matches!(result, Err(AppError::StorageFailure { .. })));
    }
}
