//! DTOs for the lookup endpoint.

use serde::{Deserialize, Serialize};

/// Query parameters for `GET /lookup/{domain}`.
#[derive(Debug, Default, Deserialize)]
pub struct LookupQuery {
    /// Return full hostnames instead of bare labels.
    #[serde(default)]
    pub full: bool,
}

/// Labels (or full hostnames) recorded for a registrable domain.
#[derive(Debug, Serialize)]
pub struct LookupResponse {
    pub domain: String,
    pub full: bool,
    pub total: usize,
    pub items: Vec<String>,
}
