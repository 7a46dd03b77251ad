//! Uniqueness projector: derives the four presence-only collections from the shard store.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use metrics::counter;
use serde::Serialize;
use serde_json::json;
use tokio::time::Instant;
use tracing::{error, info};

use super::within;
use crate::domain::entities::{ShardDocument, UniqueKind};
use crate::domain::repositories::{ShardRepository, UniqueRepository};
use crate::error::AppError;

/// Maximum number of values sent to the store in one upsert.
const BATCH_SIZE: usize = 5_000;

/// Counters for one projector run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectionSummary {
    pub documents_scanned: u64,
    pub labels_scanned: u64,
    pub new_tlds: u64,
    pub new_domains: u64,
    pub new_full_domains: u64,
    pub new_subs: u64,
    pub duration_ms: u64,
}

impl ProjectionSummary {
    fn record(&mut self, kind: UniqueKind, inserted: u64) {
        match kind {
            UniqueKind::Tld => self.new_tlds += inserted,
            UniqueKind::Domain => self.new_domains += inserted,
            UniqueKind::FullDomain => self.new_full_domains += inserted,
            UniqueKind::Sub => self.new_subs += inserted,
        }
    }

    /// Total number of values that were not projected before this run.
    pub fn total_new(&self) -> u64 {
        self.new_tlds + self.new_domains + self.new_full_domains + self.new_subs
    }
}

/// Full-corpus batch job maintaining the uniqueness projections.
///
/// Streams every shard document and upserts the derived values one document at
/// a time, so memory use is bounded by the largest shard. Runs are idempotent:
/// an aborted run leaves the projections valid and a re-run completes them.
pub struct ProjectorService<S: ShardRepository + ?Sized, U: UniqueRepository + ?Sized> {
    shards: Arc<S>,
    uniques: Arc<U>,
    timeout: Duration,
}

impl<S, U> ProjectorService<S, U>
where
    S: ShardRepository + ?Sized,
    U: UniqueRepository + ?Sized,
{
    /// Creates a new projector. `timeout` bounds each store round trip.
    pub fn new(shards: Arc<S>, uniques: Arc<U>, timeout: Duration) -> Self {
        Self {
            shards,
            uniques,
            timeout,
        }
    }

    /// Scans the whole shard store and projects every value.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StorageFailure`] or [`AppError::Timeout`] from the first
    /// failing read or upsert; the run stops there.
    pub async fn run(&self) -> Result<ProjectionSummary, AppError> {
        let started = Instant::now();
        let result = self.project().await;

        match &result {
            Ok(summary) => {
                counter!("projection_runs_total", "result" => "success").increment(1);
                info!(
                    documents = summary.documents_scanned,
                    labels = summary.labels_scanned,
                    new_values = summary.total_new(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Projection run finished"
                );
            }
            Err(e) => {
                counter!("projection_runs_total", "result" => "failure").increment(1);
                error!(error = %e, "Projection run failed");
            }
        }

        result
    }

    async fn project(&self) -> Result<ProjectionSummary, AppError> {
        let started = Instant::now();
        let mut summary = ProjectionSummary::default();
        let mut documents = self.shards.scan();

        loop {
            let next = tokio::time::timeout(self.timeout, documents.next())
                .await
                .map_err(|_| {
                    AppError::timeout(
                        "Shard scan timed out",
                        json!({ "documents_scanned": summary.documents_scanned }),
                    )
                })?;

            let Some(document) = next else { break };
            self.project_document(&document?, &mut summary).await?;
        }

        summary.duration_ms = started.elapsed().as_millis() as u64;
        Ok(summary)
    }

    async fn project_document(
        &self,
        document: &ShardDocument,
        summary: &mut ProjectionSummary,
    ) -> Result<(), AppError> {
        summary.documents_scanned += 1;

        if document.labels.is_empty() {
            return Ok(());
        }
        summary.labels_scanned += document.labels.len() as u64;

        self.upsert(UniqueKind::Tld, vec![document.suffix.clone()], summary)
            .await?;
        self.upsert(UniqueKind::Domain, vec![document.domain.clone()], summary)
            .await?;

        let hostnames: Vec<String> = document.full_hostnames().collect();
        for chunk in hostnames.chunks(BATCH_SIZE) {
            self.upsert(UniqueKind::FullDomain, chunk.to_vec(), summary)
                .await?;
        }

        let subs: Vec<String> = document
            .labels
            .iter()
            .filter(|label| !label.is_empty())
            .cloned()
            .collect();
        for chunk in subs.chunks(BATCH_SIZE) {
            self.upsert(UniqueKind::Sub, chunk.to_vec(), summary).await?;
        }

        Ok(())
    }

    async fn upsert(
        &self,
        kind: UniqueKind,
        values: Vec<String>,
        summary: &mut ProjectionSummary,
    ) -> Result<(), AppError> {
        let inserted = within(
            self.timeout,
            "insert_unique",
            self.uniques.insert_many(kind, values),
        )
        .await?;

        if inserted > 0 {
            counter!("projection_inserted_total", "kind" => kind.as_str()).increment(inserted);
        }
        summary.record(kind, inserted);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::ShardKey;
    use crate::domain::repositories::MockUniqueRepository;
    use crate::infrastructure::persistence::{MemoryShardRepository, MemoryUniqueRepository};
    use std::collections::BTreeSet;

    async fn seeded_store() -> Arc<MemoryShardRepository> {
        let repo = Arc::new(MemoryShardRepository::new());
        for (label, shard) in [("www", 0), ("", 0), ("api", 1)] {
            repo.add_label(&ShardKey::new("test", "example", shard), label, u64::MAX)
                .await
                .unwrap();
        }
        repo
    }

    fn set(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[tokio::test]
    async fn test_run_projects_every_kind() {
        let uniques = Arc::new(MemoryUniqueRepository::new());
        let projector =
            ProjectorService::new(seeded_store().await, uniques.clone(), Duration::from_secs(5));

        let summary = projector.run().await.unwrap();

        assert_eq!(summary.documents_scanned, 2);
        assert_eq!(summary.labels_scanned, 3);
        assert_eq!(summary.new_tlds, 1);
        assert_eq!(summary.new_domains, 1);
        assert_eq!(summary.new_full_domains, 3);
        assert_eq!(summary.new_subs, 2);

        assert_eq!(uniques.snapshot(UniqueKind::Tld), set(&["example"]));
        assert_eq!(uniques.snapshot(UniqueKind::Domain), set(&["test"]));
        assert_eq!(
            uniques.snapshot(UniqueKind::FullDomain),
            set(&["test.example", "www.test.example", "api.test.example"])
        );
        assert_eq!(uniques.snapshot(UniqueKind::Sub), set(&["www", "api"]));
    }

    #[tokio::test]
    async fn test_second_run_adds_nothing() {
        let uniques = Arc::new(MemoryUniqueRepository::new());
        let projector =
            ProjectorService::new(seeded_store().await, uniques.clone(), Duration::from_secs(5));

        projector.run().await.unwrap();
        let before: Vec<_> = UniqueKind::ALL.iter().map(|k| uniques.snapshot(*k)).collect();

        let summary = projector.run().await.unwrap();
        let after: Vec<_> = UniqueKind::ALL.iter().map(|k| uniques.snapshot(*k)).collect();

        assert_eq!(summary.total_new(), 0);
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_upsert_failure_aborts_run() {
        let mut uniques = MockUniqueRepository::new();
        uniques
            .expect_insert_many()
            .times(1)
            .returning(|_, _| Err(AppError::storage("unique index down", json!({}))));

        let projector =
            ProjectorService::new(seeded_store().await, Arc::new(uniques), Duration::from_secs(5));

        let err = projector.run().await.unwrap_err();
        assert!(matches!(err, AppError::StorageFailure { .. }));
    }

    #[tokio::test]
    async fn test_empty_store() {
        let projector = ProjectorService::new(
            Arc::new(MemoryShardRepository::new()),
            Arc::new(MemoryUniqueRepository::new()),
            Duration::from_secs(5),
        );

        let summary = projector.run().await.unwrap();
        assert_eq!(summary.documents_scanned, 0);
        assert_eq!(summary.total_new(), 0);
    }
}
