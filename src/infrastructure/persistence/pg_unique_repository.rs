//! PostgreSQL implementation of the uniqueness projections.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::entities::UniqueKind;
use crate::domain::repositories::UniqueRepository;
use crate::error::AppError;

/// PostgreSQL repository for the four `unique_*` tables.
///
/// Table and column names come from [`UniqueKind`], never from user input.
pub struct PgUniqueRepository {
    pool: Arc<PgPool>,
}

impl PgUniqueRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UniqueRepository for PgUniqueRepository {
    async fn insert_many(&self, kind: UniqueKind, values: Vec<String>) -> Result<u64, AppError> {
        if values.is_empty() {
            return Ok(0);
        }

        let sql = format!(
            "INSERT INTO {table} ({column}) SELECT DISTINCT UNNEST($1::TEXT[]) ON CONFLICT DO NOTHING",
            table = kind.table(),
            column = kind.column(),
        );

        let result = sqlx::query(&sql)
            .bind(values)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected())
    }

    async fn count(&self, kind: UniqueKind) -> Result<i64, AppError> {
        let sql = format!("SELECT COUNT(*) FROM {}", kind.table());

        let count: i64 = sqlx::query_scalar(&sql)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }
}
