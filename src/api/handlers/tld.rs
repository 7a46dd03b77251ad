//! Handler for suffix discovery.

use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::json;

use crate::api::dto::tld::TldResponse;
use crate::error::AppError;
use crate::state::AppState;

/// Lists the suffixes a second-level name is recorded under.
///
/// # Endpoint
///
/// `GET /tld/{label}`
///
/// # Errors
///
/// - 400 if `{label}` is not a single DNS label
/// - 404 when the name is not recorded under any suffix
pub async fn tld_handler(
    State(state): State<AppState>,
    Path(label): Path<String>,
) -> Result<Json<TldResponse>, AppError> {
    let suffixes = state.shard_service.tld_lookup(&label).await?;

    if suffixes.is_empty() {
        return Err(AppError::not_found(
            "No suffixes recorded",
            json!({ "label": label }),
        ));
    }

    Ok(Json(TldResponse {
        label,
        suffixes: suffixes.into_iter().collect(),
    }))
}
