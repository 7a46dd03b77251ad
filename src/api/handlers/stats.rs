//! Handler for registry statistics.

use axum::{Json, extract::State};

use crate::api::dto::stats::StatsResponse;
use crate::error::AppError;
use crate::state::AppState;

/// Returns collection sizes.
///
/// # Endpoint
///
/// `GET /stat`
///
/// # Response
///
/// ```json
/// {
///   "total": 120,
///   "tlds": 14,
///   "domains": 97,
///   "full_domains": 5310,
///   "subs": 2284,
///   "generated_at": "2026-01-01T00:00:00Z"
/// }
/// ```
///
/// Projection counts reflect the last projector run.
pub async fn stats_handler(State(state): State<AppState>) -> Result<Json<StatsResponse>, AppError> {
    let report = state.stats_service.report().await?;
    Ok(Json(report.into()))
}
