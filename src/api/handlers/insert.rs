//! Handlers for recording hostnames.

use axum::{
    Json,
    extract::{Path, State},
};
use validator::Validate;

use crate::api::dto::insert::{BatchSummary, InsertRequest, InsertResponse, InsertResultItem};
use crate::application::services::InsertOutcome;
use crate::error::AppError;
use crate::state::AppState;

/// Records one hostname.
///
/// # Endpoint
///
/// `PUT /insert/{hostname}`
///
/// # Response
///
/// ```json
/// { "label": "www", "domain": "example", "suffix": "com", "shard": 0, "status": "created" }
/// ```
///
/// # Errors
///
/// - 400 `invalid_domain` / `public_suffix` for bad hostnames
/// - 500 `storage_error`, 504 `timeout` for store failures
pub async fn insert_handler(
    State(state): State<AppState>,
    Path(hostname): Path<String>,
) -> Result<Json<InsertOutcome>, AppError> {
    let outcome = state.shard_service.insert(&hostname).await?;
    Ok(Json(outcome))
}

/// Records a batch of hostnames.
///
/// # Endpoint
///
/// `POST /insert`
///
/// # Batch Processing
///
/// Hostnames are processed independently. If one fails, the others are still
/// recorded and the failure is reported in its result item.
///
/// # Request Body
///
/// ```json
/// { "hostnames": ["www.example.com", "api.example.com"] }
/// ```
///
/// # Errors
///
/// Returns 400 Bad Request if the list is empty or longer than 1000 entries.
pub async fn batch_insert_handler(
    State(state): State<AppState>,
    Json(payload): Json<InsertRequest>,
) -> Result<Json<InsertResponse>, AppError> {
    payload.validate()?;

    let total = payload.hostnames.len();
    let results = state.shard_service.insert_many(&payload.hostnames).await;

    let mut items = Vec::with_capacity(total);
    let mut successful = 0;
    let mut failed = 0;

    for (hostname, result) in payload.hostnames.into_iter().zip(results) {
        match result {
            Ok(outcome) => {
                successful += 1;
                items.push(InsertResultItem::Success { hostname, outcome });
            }
            Err(err) => {
                failed += 1;
                items.push(InsertResultItem::Error {
                    hostname,
                    error: err.to_info().1,
                });
            }
        }
    }

    Ok(Json(InsertResponse {
        summary: BatchSummary {
            total,
            successful,
            failed,
        },
        items,
    }))
}
