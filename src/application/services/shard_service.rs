//! Sharded label store: insert, lookup and TLD lookup.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use metrics::{counter, histogram};
use serde::Serialize;
use serde_json::json;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::within;
use crate::domain::entities::{HostnameParts, ShardDocument, ShardKey};
use crate::domain::repositories::{LabelUpsert, ShardRepository};
use crate::error::AppError;
use crate::infrastructure::cache::ShardHintCache;
use crate::utils::hostname_normalizer::{normalize, registrable, validate_label};

/// Default document size cap (16 MiB).
pub const DEFAULT_MAX_DOCUMENT_SIZE: u64 = 16 * 1024 * 1024;

/// Size cap and deadline applied to store operations.
#[derive(Debug, Clone, Copy)]
pub struct StoreLimits {
    pub max_document_size: u64,
    pub timeout: Duration,
}

impl Default for StoreLimits {
    fn default() -> Self {
        Self {
            max_document_size: DEFAULT_MAX_DOCUMENT_SIZE,
            timeout: Duration::from_secs(30),
        }
    }
}

/// What an insert did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertStatus {
    /// A new shard document was created holding the label.
    Created,
    /// The label was appended to an existing shard.
    Added,
    /// The label was already recorded; nothing changed.
    AlreadyPresent,
}

impl InsertStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            InsertStatus::Created => "created",
            InsertStatus::Added => "added",
            InsertStatus::AlreadyPresent => "already_present",
        }
    }
}

/// Result of a successful insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InsertOutcome {
    pub label: String,
    pub domain: String,
    pub suffix: String,
    /// Index of the shard that holds the label.
    pub shard: u32,
    pub status: InsertStatus,
}

/// Service owning the per-domain shard families.
///
/// Inserts scan shards forward from 0 and move on whenever the store reports
/// the target shard as full. Lookups stream every shard of a family and union
/// their labels. All coordination between concurrent callers is left to the
/// store's atomic single-document upsert.
pub struct ShardService<R: ShardRepository + ?Sized> {
    repository: Arc<R>,
    cache: Arc<dyn ShardHintCache>,
    limits: StoreLimits,
}

impl<R: ShardRepository + ?Sized> ShardService<R> {
    /// Creates a new shard service.
    pub fn new(repository: Arc<R>, cache: Arc<dyn ShardHintCache>, limits: StoreLimits) -> Self {
        Self {
            repository,
            cache,
            limits,
        }
    }

    /// Records a hostname's label under its registrable domain.
    ///
    /// Inserting the same hostname again is a no-op reported as
    /// [`InsertStatus::AlreadyPresent`].
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidDomain`] or [`AppError::NotDecomposable`] for bad input.
    /// Returns [`AppError::StorageFailure`] on store errors, or when the label cannot
    /// fit even into an empty shard.
    /// Returns [`AppError::Timeout`] when a store round trip exceeds the deadline.
    pub async fn insert(&self, hostname: &str) -> Result<InsertOutcome, AppError> {
        let HostnameParts {
            label,
            domain,
            suffix,
        } = normalize(hostname)?;

        if !ShardDocument::fits_empty(&domain, &suffix, &label, self.limits.max_document_size) {
            return Err(AppError::storage(
                "Label does not fit into an empty shard",
                json!({
                    "hostname": hostname,
                    "max_document_size": self.limits.max_document_size,
                }),
            ));
        }

        let known_shards = self.known_shard_count(&domain, &suffix).await;

        if known_shards > 1 {
            let existing = within(
                self.limits.timeout,
                "find_label_shard",
                self.repository.find_label_shard(&domain, &suffix, &label),
            )
            .await?;

            if let Some(shard) = existing {
                debug!(%domain, %suffix, shard, "Label found via shard hint");
                counter!("shard_inserts_total", "status" => InsertStatus::AlreadyPresent.as_str())
                    .increment(1);
                return Ok(InsertOutcome {
                    label,
                    domain,
                    suffix,
                    shard,
                    status: InsertStatus::AlreadyPresent,
                });
            }
        }

        let mut key = ShardKey::new(domain, suffix, 0);

        let status = loop {
            let upsert = within(
                self.limits.timeout,
                "add_label",
                self.repository
                    .add_label(&key, &label, self.limits.max_document_size),
            )
            .await?;

            match upsert {
                LabelUpsert::ShardFull => {
                    debug!(domain = %key.domain, suffix = %key.suffix, shard = key.shard, "Shard full");
                    counter!("shard_overflow_total").increment(1);
                    key = key.next();
                }
                LabelUpsert::Created => break InsertStatus::Created,
                LabelUpsert::Added => break InsertStatus::Added,
                LabelUpsert::AlreadyPresent => break InsertStatus::AlreadyPresent,
            }
        };

        counter!("shard_inserts_total", "status" => status.as_str()).increment(1);
        histogram!("shard_insert_depth").record(f64::from(key.shard));

        if key.shard > 0 && key.shard + 1 > known_shards {
            self.remember_shard_count(&key.domain, &key.suffix, key.shard + 1)
                .await;
        }

        Ok(InsertOutcome {
            label,
            domain: key.domain,
            suffix: key.suffix,
            shard: key.shard,
            status,
        })
    }

    /// Inserts each hostname independently, one result per input in order.
    pub async fn insert_many(&self, hostnames: &[String]) -> Vec<Result<InsertOutcome, AppError>> {
        let mut results = Vec::with_capacity(hostnames.len());
        for hostname in hostnames {
            results.push(self.insert(hostname).await);
        }
        results
    }

    /// Returns every label recorded for the registrable domain of `domain`.
    ///
    /// A full hostname is accepted; its label part is ignored. An unknown but
    /// valid domain yields an empty set.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidDomain`] when no registrable domain can be
    /// extracted, including for a bare public suffix such as `com`.
    /// If the shard stream breaks, returns [`AppError::StorageFailure`] (or
    /// [`AppError::Timeout`]) whose details hold the labels gathered so far under
    /// `"partial"` with `"complete": false`.
    pub async fn lookup(&self, domain: &str) -> Result<BTreeSet<String>, AppError> {
        let (domain, suffix) = lookup_key(domain)?;
        self.gather(&domain, &suffix).await
    }

    /// Same as [`Self::lookup`], rendered as full hostnames.
    ///
    /// # Errors
    ///
    /// See [`Self::lookup`].
    pub async fn lookup_full(&self, domain: &str) -> Result<BTreeSet<String>, AppError> {
        let (domain, suffix) = lookup_key(domain)?;
        let labels = self.gather(&domain, &suffix).await?;

        Ok(labels
            .iter()
            .map(|label| HostnameParts::full_hostname(label, &domain, &suffix))
            .collect())
    }

    /// Returns every suffix a second-level name is recorded under.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidDomain`] if `label` is not a single DNS label.
    pub async fn tld_lookup(&self, label: &str) -> Result<BTreeSet<String>, AppError> {
        let label = validate_label(label)?;

        within(
            self.limits.timeout,
            "find_suffixes",
            self.repository.find_suffixes(&label),
        )
        .await
    }

    /// Number of shard documents the registrable domain of `domain` spans.
    ///
    /// # Errors
    ///
    /// Same input errors as [`Self::lookup`].
    pub async fn shard_count(&self, domain: &str) -> Result<i64, AppError> {
        let (domain, suffix) = lookup_key(domain)?;

        within(
            self.limits.timeout,
            "count_family",
            self.repository.count_family(&domain, &suffix),
        )
        .await
    }

    pub async fn health_check(&self) -> bool {
        self.repository.health_check().await
    }

    /// Streams a family and unions its labels under a single deadline.
    async fn gather(&self, domain: &str, suffix: &str) -> Result<BTreeSet<String>, AppError> {
        let deadline = Instant::now() + self.limits.timeout;
        let mut family = self.repository.family(domain, suffix);
        let mut labels = BTreeSet::new();

        loop {
            let next = match tokio::time::timeout_at(deadline, family.next()).await {
                Ok(next) => next,
                Err(_) => {
                    return Err(AppError::timeout(
                        "Lookup timed out",
                        partial_details(domain, suffix, &labels, None),
                    ));
                }
            };

            match next {
                Some(Ok(document)) => labels.extend(document.labels),
                Some(Err(e)) => {
                    warn!(%domain, %suffix, error = %e, "Shard stream broke during lookup");
                    return Err(AppError::storage(
                        "Lookup incomplete",
                        partial_details(domain, suffix, &labels, Some(&e)),
                    ));
                }
                None => return Ok(labels),
            }
        }
    }

    /// Last known shard count, 0 when unknown. Cache errors fail open.
    async fn known_shard_count(&self, domain: &str, suffix: &str) -> u32 {
        match self.cache.get_shard_count(domain, suffix).await {
            Ok(count) => count.unwrap_or(0),
            Err(e) => {
                warn!(%domain, %suffix, error = %e, "Shard hint lookup failed");
                0
            }
        }
    }

    async fn remember_shard_count(&self, domain: &str, suffix: &str, count: u32) {
        if let Err(e) = self.cache.set_shard_count(domain, suffix, count).await {
            warn!(%domain, %suffix, error = %e, "Failed to store shard hint");
        }
    }
}

/// Registrable `(domain, suffix)` for read paths.
///
/// Reads report every unusable input as [`AppError::InvalidDomain`]; only
/// Insert tells a bare public suffix apart.
fn lookup_key(domain: &str) -> Result<(String, String), AppError> {
    registrable(domain).map_err(|e| match e {
        AppError::NotDecomposable { message, details } => {
            AppError::InvalidDomain { message, details }
        }
        other => other,
    })
}

fn partial_details(
    domain: &str,
    suffix: &str,
    labels: &BTreeSet<String>,
    cause: Option<&AppError>,
) -> serde_json::Value {
    json!({
        "domain": domain,
        "suffix": suffix,
        "partial": labels,
        "complete": false,
        "reason": cause.map(ToString::to_string),
    })
}
