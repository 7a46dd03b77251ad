//! API route configuration.

use crate::api::handlers::{
    batch_insert_handler, insert_handler, lookup_handler, stats_handler, tld_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post, put},
};

/// Registry routes.
///
/// # Endpoints
///
/// - `GET  /lookup/{domain}`   - Labels of a domain (`?full=true` for hostnames)
/// - `PUT  /insert/{hostname}` - Record one hostname
/// - `POST /insert`            - Record a batch of hostnames
/// - `GET  /tld/{label}`       - Suffixes a second-level name is recorded under
/// - `GET  /stat`              - Collection sizes
pub fn registry_routes() -> Router<AppState> {
    Router::new()
        .route("/lookup/{domain}", get(lookup_handler))
        .route("/insert/{hostname}", put(insert_handler))
        .route("/insert", post(batch_insert_handler))
        .route("/tld/{label}", get(tld_handler))
        .route("/stat", get(stats_handler))
}
