//! In-process report store.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use super::ReportStore;
use crate::error::StoreError;
use crate::models::report::{NewReport, Report, ReportUpdate};

/// Keeps reports in memory, assigning ids and timestamps like the hosted
/// table does.
#[derive(Default)]
pub struct MemoryReportStore {
    reports: Mutex<BTreeMap<String, Report>>,
}

impl MemoryReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All stored reports, oldest first.
    pub fn reports(&self) -> Vec<Report> {
        let mut reports: Vec<Report> = self.lock().values().cloned().collect();
        reports.sort_by_key(|r| r.created_at);
        reports
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, Report>> {
        self.reports.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Next `updated_at`: now, but strictly after the previous value.
fn next_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

#[async_trait]
impl ReportStore for MemoryReportStore {
    async fn insert(&self, report: &NewReport) -> Result<Report, StoreError> {
        let now = Utc::now();
        let stored = Report {
            id: Uuid::new_v4().to_string(),
            raw_message: report.raw_message.clone(),
            fields: report.fields.clone(),
            created_at: now,
            updated_at: now,
        };
        self.lock().insert(stored.id.clone(), stored.clone());
        Ok(stored)
    }

    async fn get(&self, id: &str) -> Result<Report, StoreError> {
        self.lock()
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn update(&self, id: &str, update: &ReportUpdate) -> Result<Report, StoreError> {
        let mut reports = self.lock();
        let report = reports
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        report.fields = update.clone();
        report.updated_at = next_timestamp(report.updated_at);
        Ok(report.clone())
    }
}
