//! Report persistence.

mod memory;
#[cfg(feature = "native")]
pub mod rest;

pub use memory::MemoryReportStore;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::report::{NewReport, Report, ReportUpdate};

/// The hosted `reports` table.
///
/// The store assigns `id`, `created_at` and `updated_at`. Update payloads
/// carry no `raw_message`, so it stays as inserted.
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Insert a new report and return the stored row.
    async fn insert(&self, report: &NewReport) -> Result<Report, StoreError>;

    /// Fetch one report.
    async fn get(&self, id: &str) -> Result<Report, StoreError>;

    /// Replace the editable fields of a report and return the stored row.
    async fn update(&self, id: &str, update: &ReportUpdate) -> Result<Report, StoreError>;
}
