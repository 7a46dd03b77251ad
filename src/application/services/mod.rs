//! Business logic services for the application layer.

pub mod projector_service;
pub mod shard_service;
pub mod stats_service;

pub use projector_service::{ProjectionSummary, ProjectorService};
pub use shard_service::{InsertOutcome, InsertStatus, ShardService, StoreLimits};
pub use stats_service::{StatsReport, StatsService};

use std::future::Future;
use std::time::Duration;

use serde_json::json;

use crate::error::AppError;

/// Runs one storage operation under a deadline.
///
/// Expiry drops the in-flight future, which cancels the request.
pub(crate) async fn within<T, F>(
    deadline: Duration,
    operation: &'static str,
    future: F,
) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    tokio::time::timeout(deadline, future).await.map_err(|_| {
        AppError::timeout(
            "Storage operation timed out",
            json!({ "operation": operation, "timeout_ms": deadline.as_millis() as u64 }),
        )
    })?
}
