//! In-process shard store.
//!
//! Applies the same size model, set semantics and typed overflow signal as the
//! PostgreSQL store. The mutex stands in for the database's per-document
//! atomicity; it is never held across an await point.
//!
//! Reads are not incremental: `family` and `scan` copy the matching documents
//! out under the lock and stream the copy, so a scan costs memory proportional
//! to the whole store.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use serde_json::json;

use crate::domain::entities::{ShardDocument, ShardKey};
use crate::domain::repositories::{LabelUpsert, ShardRepository};
use crate::error::AppError;

/// Shard repository backed by an in-memory ordered map.
#[derive(Default)]
pub struct MemoryShardRepository {
    documents: Mutex<BTreeMap<ShardKey, ShardDocument>>,
}

impl MemoryShardRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn documents(&self) -> Result<MutexGuard<'_, BTreeMap<ShardKey, ShardDocument>>, AppError> {
        self.documents
            .lock()
            .map_err(|_| AppError::storage("Memory store lock poisoned", json!({})))
    }

    /// Returns a copy of one shard document, if present.
    pub fn get(&self, key: &ShardKey) -> Option<ShardDocument> {
        self.documents().ok()?.get(key).cloned()
    }

    fn snapshot<F>(&self, filter: F) -> Result<Vec<ShardDocument>, AppError>
    where
        F: Fn(&ShardDocument) -> bool,
    {
        Ok(self
            .documents()?
            .values()
            .filter(|&doc| filter(doc))
            .cloned()
            .collect())
    }
}

fn into_stream(
    documents: Result<Vec<ShardDocument>, AppError>,
) -> BoxStream<'static, Result<ShardDocument, AppError>> {
    match documents {
        Ok(docs) => stream::iter(docs.into_iter().map(Ok)).boxed(),
        Err(e) => stream::iter(std::iter::once(Err(e))).boxed(),
    }
}

#[async_trait]
impl ShardRepository for MemoryShardRepository {
    async fn add_label(
        &self,
        key: &ShardKey,
        label: &str,
        max_document_size: u64,
    ) -> Result<LabelUpsert, AppError> {
        let mut documents = self.documents()?;

        match documents.get_mut(key) {
            Some(doc) => {
                if doc.labels.contains(label) {
                    return Ok(LabelUpsert::AlreadyPresent);
                }
                if doc.encoded_size() + ShardDocument::entry_size(label) > max_document_size {
                    return Ok(LabelUpsert::ShardFull);
                }
                doc.labels.insert(label.to_string());
                Ok(LabelUpsert::Added)
            }
            None => {
                if !ShardDocument::fits_empty(&key.domain, &key.suffix, label, max_document_size) {
                    return Ok(LabelUpsert::ShardFull);
                }
                let mut doc = ShardDocument::new(key.domain.clone(), key.suffix.clone(), key.shard);
                doc.labels.insert(label.to_string());
                documents.insert(key.clone(), doc);
                Ok(LabelUpsert::Created)
            }
        }
    }

    async fn find_label_shard(
        &self,
        domain: &str,
        suffix: &str,
        label: &str,
    ) -> Result<Option<u32>, AppError> {
        Ok(self
            .documents()?
            .values()
            .find(|doc| doc.domain == domain && doc.suffix == suffix && doc.labels.contains(label))
            .map(|doc| doc.shard))
    }

    fn family(&self, domain: &str, suffix: &str) -> BoxStream<'_, Result<ShardDocument, AppError>> {
        into_stream(self.snapshot(|doc| doc.domain == domain && doc.suffix == suffix))
    }

    fn scan(&self) -> BoxStream<'_, Result<ShardDocument, AppError>> {
        into_stream(self.snapshot(|_| true))
    }

    async fn find_suffixes(&self, domain: &str) -> Result<BTreeSet<String>, AppError> {
        Ok(self
            .documents()?
            .values()
            .filter(|doc| doc.domain == domain)
            .map(|doc| doc.suffix.clone())
            .collect())
    }

    async fn count_family(&self, domain: &str, suffix: &str) -> Result<i64, AppError> {
        Ok(self
            .documents()?
            .values()
            .filter(|doc| doc.domain == domain && doc.suffix == suffix)
            .count() as i64)
    }

    async fn count_documents(&self) -> Result<i64, AppError> {
        Ok(self.documents()?.len() as i64)
    }

    async fn health_check(&self) -> bool {
        self.documents().is_ok()
    }
}
