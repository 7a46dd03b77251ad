//! DTOs for the statistics endpoint.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::application::services::StatsReport;

/// Collection sizes of the registry.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    /// Shard documents, not distinct domains.
    pub total: i64,
    pub tlds: i64,
    pub domains: i64,
    pub full_domains: i64,
    pub subs: i64,
    pub generated_at: DateTime<Utc>,
}

impl From<StatsReport> for StatsResponse {
    fn from(report: StatsReport) -> Self {
        Self {
            total: report.total_documents,
            tlds: report.unique_tlds,
            domains: report.unique_domains,
            full_domains: report.unique_full_domains,
            subs: report.unique_subs,
            generated_at: report.generated_at,
        }
    }
}
