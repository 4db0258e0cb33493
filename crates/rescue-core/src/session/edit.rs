//! The edit dialog for one stored report.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use super::{Attempt, FlightGate};
use crate::error::RescueError;
use crate::models::report::Report;
use crate::report::ReportDraft;
use crate::store::ReportStore;

pub struct EditSession {
    report_id: String,
    store: Arc<dyn ReportStore>,
    gate: FlightGate,
    draft: Mutex<ReportDraft>,
}

impl EditSession {
    /// Start editing an already loaded report.
    pub fn new(store: Arc<dyn ReportStore>, report: &Report) -> Self {
        Self {
            report_id: report.id.clone(),
            store,
            gate: FlightGate::new(),
            draft: Mutex::new(ReportDraft::from_report(report)),
        }
    }

    /// Fetch a report and start editing it.
    pub async fn open(store: Arc<dyn ReportStore>, id: &str) -> Result<Self, RescueError> {
        let report = store.get(id).await?;
        debug!("Opened report {} for editing", id);
        Ok(Self::new(store, &report))
    }

    pub fn report_id(&self) -> &str {
        &self.report_id
    }

    /// Current form state.
    pub fn draft(&self) -> ReportDraft {
        self.lock().clone()
    }

    /// Change the form state in place.
    pub fn edit<R>(&self, f: impl FnOnce(&mut ReportDraft) -> R) -> R {
        f(&mut self.lock())
    }

    pub fn is_busy(&self) -> bool {
        self.gate.is_busy()
    }

    /// Merge the draft and write it back.
    ///
    /// On success the draft is reset from the stored row. On failure it is
    /// left as the user typed it.
    pub async fn save(&self) -> Result<Attempt<Report>, RescueError> {
        let Some(_guard) = self.gate.try_begin() else {
            debug!("Save requested while another save is in flight");
            return Ok(Attempt::AlreadyRunning);
        };

        let update = self.lock().to_update();
        let report = self
            .store
            .update(&self.report_id, &update)
            .await
            .map_err(|e| {
                warn!("Saving report {} failed: {}", self.report_id, e);
                RescueError::from(e)
            })?;

        info!("Updated report {}", report.id);
        *self.lock() = ReportDraft::from_report(&report);
        Ok(Attempt::Ran(report))
    }

    fn lock(&self) -> MutexGuard<'_, ReportDraft> {
        self.draft.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::models::report::{HelpCategory, NewReport, ReportFields, UrgencyLevel};
    use crate::store::MemoryReportStore;
    use pretty_assertions::assert_eq;

    async fn stored(store: &MemoryReportStore) -> Report {
        let fields = ReportFields {
            name: "สมหญิง".to_string(),
            phone: vec!["081-234-5678".to_string()],
            number_of_adults: 2,
            ..ReportFields::default()
        };
        store
            .insert(&NewReport {
                raw_message: "สมหญิง 0812345678 ผู้ใหญ่ 2 คน".to_string(),
                fields,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_save_merges_draft() {
        let store = Arc::new(MemoryReportStore::new());
        let report = stored(&store).await;
        let session = EditSession::open(store.clone(), &report.id).await.unwrap();

        session
            .edit(|draft| -> Result<(), crate::error::IntakeError> {
                draft.set_field("phone", "0899999999, 02 123 4567")?;
                draft.set_field("number_of_children", "abc")?;
                draft.set_field("urgency_level", "4")?;
                draft.set_field("name", "  ")?;
                draft.toggle_category(HelpCategory::Boat);
                Ok(())
            })
            .unwrap();

        let saved = session.save().await.unwrap().ran().unwrap();
        assert_eq!(saved.raw_message, report.raw_message);
        assert_eq!(saved.fields.phone, vec!["089-999-9999", "02-123-4567"]);
        assert_eq!(saved.fields.number_of_adults, 2);
        assert_eq!(saved.fields.number_of_children, 0);
        assert_eq!(saved.fields.urgency_level, UrgencyLevel::new(4).unwrap());
        assert_eq!(saved.fields.name, "ไม่ระบุชื่อ");
        assert!(saved.fields.help_categories.contains(HelpCategory::Boat));
        assert!(saved.updated_at > report.updated_at);

        assert_eq!(session.draft().phone, "089-999-9999, 02-123-4567");
        assert!(!session.is_busy());
    }

    #[tokio::test]
    async fn test_open_missing_report() {
        let store = Arc::new(MemoryReportStore::new());
        let result = EditSession::open(store, "missing").await;
        assert!(matches!(result, Err(RescueError::Store(StoreError::NotFound(_)))));
    }

    #[tokio::test]
    async fn test_concurrent_save_is_refused() {
        let store = Arc::new(MemoryReportStore::new());
        let report = stored(&store).await;
        let session = EditSession::new(store, &report);

        let _held = session.gate.try_begin();
        assert!(session.save().await.unwrap().is_already_running());
    }
}
