//! In-process uniqueness projections.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::json;

use crate::domain::entities::UniqueKind;
use crate::domain::repositories::UniqueRepository;
use crate::error::AppError;

/// Projection store holding one ordered set per [`UniqueKind`].
#[derive(Default)]
pub struct MemoryUniqueRepository {
    values: Mutex<HashMap<UniqueKind, BTreeSet<String>>>,
}

impl MemoryUniqueRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn values(&self) -> Result<MutexGuard<'_, HashMap<UniqueKind, BTreeSet<String>>>, AppError> {
        self.values
            .lock()
            .map_err(|_| AppError::storage("Memory store lock poisoned", json!({})))
    }

    /// Returns a copy of every value in one projection.
    pub fn snapshot(&self, kind: UniqueKind) -> BTreeSet<String> {
        self.values()
            .ok()
            .and_then(|values| values.get(&kind).cloned())
            .unwrap_or_default()
    }
}

#[async_trait]
impl UniqueRepository for MemoryUniqueRepository {
    async fn insert_many(&self, kind: UniqueKind, values: Vec<String>) -> Result<u64, AppError> {
        let mut all = self.values()?;
        let set = all.entry(kind).or_default();

        Ok(values.into_iter().filter(|v| set.insert(v.clone())).count() as u64)
    }

    async fn count(&self, kind: UniqueKind) -> Result<i64, AppError> {
        Ok(self.values()?.get(&kind).map_or(0, |set| set.len()) as i64)
    }
}
