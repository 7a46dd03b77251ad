//! PostgreSQL implementation of the shard repository.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use serde_json::json;
use sqlx::PgPool;

use crate::domain::entities::{ShardDocument, ShardKey};
use crate::domain::repositories::{LabelUpsert, ShardRepository};
use crate::error::AppError;

/// Row shape of the `shards` table.
#[derive(Debug, sqlx::FromRow)]
struct ShardRow {
    domain: String,
    suffix: String,
    shard: i32,
    labels: Vec<String>,
}

impl From<ShardRow> for ShardDocument {
    fn from(row: ShardRow) -> Self {
        Self {
            domain: row.domain,
            suffix: row.suffix,
            shard: row.shard.max(0) as u32,
            labels: row.labels.into_iter().collect(),
        }
    }
}

/// Rows fetched per page by [`PgShardRepository::scan`].
const SCAN_PAGE_SIZE: i64 = 500;

/// Position of a paged scan.
enum ScanCursor {
    Start,
    After(ShardKey),
    Done,
}

/// PostgreSQL repository for shard documents.
///
/// Each shard is one row keyed by `(domain, suffix, shard)`. The `size_bytes`
/// column tracks the serialized-size model of [`ShardDocument`] so the document
/// cap is checked inside the same atomic upsert that appends the label.
pub struct PgShardRepository {
    pool: Arc<PgPool>,
}

impl PgShardRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// One keyset page of the whole store, ordered by `(domain, suffix, shard)`.
    async fn scan_page(&self, after: Option<&ShardKey>) -> Result<Vec<ShardDocument>, AppError> {
        let rows: Vec<ShardRow> = match after {
            None => {
                sqlx::query_as(
                    r#"
                    SELECT domain, suffix, shard, labels
                    FROM shards
                    ORDER BY domain, suffix, shard
                    LIMIT $1
                    "#,
                )
                .bind(SCAN_PAGE_SIZE)
                .fetch_all(self.pool.as_ref())
                .await?
            }
            Some(key) => {
                sqlx::query_as(
                    r#"
                    SELECT domain, suffix, shard, labels
                    FROM shards
                    WHERE (domain, suffix, shard) > ($1, $2, $3)
                    ORDER BY domain, suffix, shard
                    LIMIT $4
                    "#,
                )
                .bind(&key.domain)
                .bind(&key.suffix)
                .bind(shard_index(key)?)
                .bind(SCAN_PAGE_SIZE)
                .fetch_all(self.pool.as_ref())
                .await?
            }
        };

        Ok(rows.into_iter().map(ShardDocument::from).collect())
    }
}

fn shard_index(key: &ShardKey) -> Result<i32, AppError> {
    i32::try_from(key.shard).map_err(|_| {
        AppError::storage("Shard index out of range", json!({ "shard": key.shard }))
    })
}

fn byte_count(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

#[async_trait]
impl ShardRepository for PgShardRepository {
    async fn add_label(
        &self,
        key: &ShardKey,
        label: &str,
        max_document_size: u64,
    ) -> Result<LabelUpsert, AppError> {
        let shard = shard_index(key)?;
        let entry = ShardDocument::entry_size(label);
        let initial = ShardDocument::base_size(&key.domain, &key.suffix) + entry;

        if initial > max_document_size {
            return Ok(LabelUpsert::ShardFull);
        }

        // Creates the shard or appends the label, unless it is already present or
        // the document would outgrow the cap. `xmax = 0` only holds for fresh inserts.
        let created: Option<bool> = sqlx::query_scalar(
            r#"
            INSERT INTO shards (domain, suffix, shard, labels, size_bytes)
            VALUES ($1, $2, $3, ARRAY[$4::TEXT], $5)
            ON CONFLICT (domain, suffix, shard) DO UPDATE
            SET labels     = array_append(shards.labels, $4::TEXT),
                size_bytes = shards.size_bytes + $6
            WHERE NOT ($4::TEXT = ANY(shards.labels))
              AND shards.size_bytes + $6 <= $7
            RETURNING (xmax = 0)
            "#,
        )
        .bind(&key.domain)
        .bind(&key.suffix)
        .bind(shard)
        .bind(label)
        .bind(byte_count(initial))
        .bind(byte_count(entry))
        .bind(byte_count(max_document_size))
        .fetch_optional(self.pool.as_ref())
        .await?;

        match created {
            Some(true) => return Ok(LabelUpsert::Created),
            Some(false) => return Ok(LabelUpsert::Added),
            None => {}
        }

        // Nothing changed: either the label is already there or the shard is full.
        // Documents only grow, so the answer cannot flip back after the upsert.
        let present: Option<bool> = sqlx::query_scalar(
            r#"
            SELECT $4::TEXT = ANY(labels)
            FROM shards
            WHERE domain = $1 AND suffix = $2 AND shard = $3
            "#,
        )
        .bind(&key.domain)
        .bind(&key.suffix)
        .bind(shard)
        .bind(label)
        .fetch_optional(self.pool.as_ref())
        .await?;

        match present {
            Some(true) => Ok(LabelUpsert::AlreadyPresent),
            Some(false) => Ok(LabelUpsert::ShardFull),
            None => Err(AppError::storage(
                "Shard disappeared during upsert",
                json!({ "domain": key.domain, "suffix": key.suffix, "shard": key.shard }),
            )),
        }
    }

    async fn find_label_shard(
        &self,
        domain: &str,
        suffix: &str,
        label: &str,
    ) -> Result<Option<u32>, AppError> {
        let shard: Option<i32> = sqlx::query_scalar(
            r#"
            SELECT shard
            FROM shards
            WHERE domain = $1 AND suffix = $2 AND labels @> ARRAY[$3::TEXT]
            ORDER BY shard
            LIMIT 1
            "#,
        )
        .bind(domain)
        .bind(suffix)
        .bind(label)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(shard.map(|s| s.max(0) as u32))
    }

    fn family(&self, domain: &str, suffix: &str) -> BoxStream<'_, Result<ShardDocument, AppError>> {
        sqlx::query_as::<_, ShardRow>(
            r#"
            SELECT domain, suffix, shard, labels
            FROM shards
            WHERE domain = $1 AND suffix = $2
            ORDER BY shard
            "#,
        )
        .bind(domain.to_owned())
        .bind(suffix.to_owned())
        .fetch(self.pool.as_ref())
        .map_ok(ShardDocument::from)
        .map_err(AppError::from)
        .boxed()
    }

    // Each page is its own query; no connection stays checked out while the
    // consumer handles documents.
    fn scan(&self) -> BoxStream<'_, Result<ShardDocument, AppError>> {
        stream::try_unfold(ScanCursor::Start, move |cursor| async move {
            let page = match cursor {
                ScanCursor::Start => self.scan_page(None).await?,
                ScanCursor::After(key) => self.scan_page(Some(&key)).await?,
                ScanCursor::Done => return Ok(None),
            };

            let next = match page.last() {
                Some(last) if page.len() as i64 == SCAN_PAGE_SIZE => ScanCursor::After(
                    ShardKey::new(last.domain.clone(), last.suffix.clone(), last.shard),
                ),
                _ => ScanCursor::Done,
            };

            let documents = stream::iter(page.into_iter().map(Ok::<_, AppError>));
            Ok::<_, AppError>(Some((documents, next)))
        })
        .try_flatten()
        .boxed()
    }

    async fn find_suffixes(&self, domain: &str) -> Result<BTreeSet<String>, AppError> {
        let suffixes: Vec<String> =
            sqlx::query_scalar("SELECT DISTINCT suffix FROM shards WHERE domain = $1")
                .bind(domain)
                .fetch_all(self.pool.as_ref())
                .await?;

        Ok(suffixes.into_iter().collect())
    }

    async fn count_family(&self, domain: &str, suffix: &str) -> Result<i64, AppError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM shards WHERE domain = $1 AND suffix = $2")
                .bind(domain)
                .bind(suffix)
                .fetch_one(self.pool.as_ref())
                .await?;

        Ok(count)
    }

    async fn count_documents(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM shards")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }

    async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await
            .is_ok()
    }
}
