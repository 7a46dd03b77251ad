//! DTOs for the TLD lookup endpoint.

use serde::Serialize;

/// Suffixes a second-level name is recorded under.
#[derive(Debug, Serialize)]
pub struct TldResponse {
    pub label: String,
    pub suffixes: Vec<String>,
}
