//! DTOs for the insert endpoints.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::application::services::InsertOutcome;
use crate::error::ErrorInfo;

/// Batch of hostnames to record.
#[derive(Debug, Deserialize, Validate)]
pub struct InsertRequest {
    #[validate(length(min = 1, max = 1000, message = "Between 1 and 1000 hostnames per request"))]
    pub hostnames: Vec<String>,
}

/// Response containing batch processing results.
#[derive(Debug, Serialize)]
pub struct InsertResponse {
    pub summary: BatchSummary,
    pub items: Vec<InsertResultItem>,
}

/// Result for one hostname of the batch.
///
/// Uses untagged enum for cleaner JSON structure (no discriminator field).
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum InsertResultItem {
    Success {
        hostname: String,
        #[serde(flatten)]
        outcome: InsertOutcome,
    },
    Error {
        hostname: String,
        error: ErrorInfo,
    },
}

/// Summary statistics for batch processing.
#[derive(Debug, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
}
