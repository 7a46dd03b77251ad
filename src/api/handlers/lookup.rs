//! Handler for listing the subdomains of a domain.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde_json::json;

use crate::api::dto::lookup::{LookupQuery, LookupResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Lists every label recorded for the registrable domain of `{domain}`.
///
/// # Endpoint
///
/// `GET /lookup/{domain}?full=true`
///
/// With `full=true` the items are full hostnames (`www.example.com`), otherwise
/// bare labels (`www`, and `""` for the domain itself).
///
/// # Errors
///
/// - 400 `invalid_domain` for invalid domains and bare public suffixes
/// - 404 when nothing is recorded for the domain
pub async fn lookup_handler(
    State(state): State<AppState>,
    Path(domain): Path<String>,
    Query(query): Query<LookupQuery>,
) -> Result<Json<LookupResponse>, AppError> {
    let items = if query.full {
        state.shard_service.lookup_full(&domain).await?
    } else {
        state.shard_service.lookup(&domain).await?
    };

    if items.is_empty() {
        return Err(AppError::not_found(
            "No subdomains recorded",
            json!({ "domain": domain }),
        ));
    }

    Ok(Json(LookupResponse {
        domain,
        full: query.full,
        total: items.len(),
        items: items.into_iter().collect(),
    }))
}
