//! The intake form: staged text, image OCR, extraction and candidate choice.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use super::{Attempt, FlightGate};
use crate::error::{IntakeError, RescueError};
use crate::models::report::{Report, ReportCandidate};
use crate::report::{report_from_candidate, ReportDefaults};
use crate::service::{Extraction, ExtractionClient, ImageLimits, ImagePayload, OcrClient, OcrText};
use crate::store::ReportStore;
use crate::text::{append_staged, normalize_text};

/// What a submit produced.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The service found no report in the text. Staged text is kept.
    NothingExtracted,
    /// One report was found and stored.
    Created(Report),
    /// Several reports were found; pick one with
    /// [`IntakeSession::finalize_candidate`].
    ChooseCandidate(Vec<ReportCandidate>),
}

#[derive(Debug, Default)]
struct Staged {
    text: String,
    image: Option<ImagePayload>,
    pending: Option<Pending>,
}

#[derive(Debug, Clone)]
struct Pending {
    raw_message: String,
    candidates: Vec<ReportCandidate>,
}

/// State behind the intake screen.
pub struct IntakeSession {
    extractor: Arc<dyn ExtractionClient>,
    ocr: Arc<dyn OcrClient>,
    store: Arc<dyn ReportStore>,
    limits: ImageLimits,
    defaults: ReportDefaults,
    gate: FlightGate,
    staged: Mutex<Staged>,
}

impl IntakeSession {
    pub fn new(
        extractor: Arc<dyn ExtractionClient>,
        ocr: Arc<dyn OcrClient>,
        store: Arc<dyn ReportStore>,
    ) -> Self {
        Self {
            extractor,
            ocr,
            store,
            limits: ImageLimits::default(),
            defaults: ReportDefaults::default(),
            gate: FlightGate::new(),
            staged: Mutex::new(Staged::default()),
        }
    }

    pub fn with_limits(mut self, limits: ImageLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_defaults(mut self, defaults: ReportDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Replace the staged text with its normalized form.
    pub fn stage_text(&self, text: &str) {
        self.lock().text = normalize_text(text);
    }

    pub fn staged_text(&self) -> String {
        self.lock().text.clone()
    }

    /// The image last attached, kept for preview.
    pub fn staged_image(&self) -> Option<ImagePayload> {
        self.lock().image.clone()
    }

    /// Candidates awaiting a choice, if the last submit found several.
    pub fn pending_candidates(&self) -> Vec<ReportCandidate> {
        self.lock()
            .pending
            .as_ref()
            .map(|p| p.candidates.clone())
            .unwrap_or_default()
    }

    pub fn is_busy(&self) -> bool {
        self.gate.is_busy()
    }

    /// Validate an image, OCR it and append any text found to the staged text.
    ///
    /// Validation failures are returned before the OCR service is called.
    pub async fn attach_image(&self, image: ImagePayload) -> Result<Attempt<OcrText>, RescueError> {
        image.validate(&self.limits)?;

        let Some(_guard) = self.gate.try_begin() else {
            debug!("OCR requested while another call is in flight");
            return Ok(Attempt::AlreadyRunning);
        };

        let result = self.ocr.recognize(&image).await;
        let mut staged = self.lock();
        staged.image = Some(image);

        match result {
            Ok(OcrText::Text(text)) => {
                info!("OCR recognized {} characters", text.chars().count());
                staged.text = append_staged(&staged.text, &text);
                Ok(Attempt::Ran(OcrText::Text(text)))
            }
            Ok(OcrText::NoText) => {
                info!("OCR found no text in image");
                Ok(Attempt::Ran(OcrText::NoText))
            }
            Err(e) => {
                warn!("OCR failed: {}", e);
                Err(e.into())
            }
        }
    }

    /// Extract reports from the staged text and route them by count.
    pub async fn submit(&self) -> Result<Attempt<SubmitOutcome>, RescueError> {
        let raw_message = self.staged_text();
        if raw_message.is_empty() {
            return Err(IntakeError::EmptyInput.into());
        }

        let Some(_guard) = self.gate.try_begin() else {
            debug!("Submit requested while another call is in flight");
            return Ok(Attempt::AlreadyRunning);
        };

        let extraction = self.extractor.extract(&raw_message).await.map_err(|e| {
            warn!("Extraction failed: {}", e);
            RescueError::from(e)
        })?;

        match extraction {
            Extraction::Empty => {
                info!("No report found in staged text");
                Ok(Attempt::Ran(SubmitOutcome::NothingExtracted))
            }
            Extraction::Single(candidate) => {
                let report = self.create(&candidate, &raw_message).await?;
                Ok(Attempt::Ran(SubmitOutcome::Created(report)))
            }
            Extraction::Multiple(candidates) => {
                info!("{} candidate reports found", candidates.len());
                self.lock().pending = Some(Pending {
                    raw_message,
                    candidates: candidates.clone(),
                });
                Ok(Attempt::Ran(SubmitOutcome::ChooseCandidate(candidates)))
            }
        }
    }

    /// Store the chosen candidate from the last multi-report submit.
    pub async fn finalize_candidate(&self, index: usize) -> Result<Attempt<Report>, RescueError> {
        let Some(_guard) = self.gate.try_begin() else {
            return Ok(Attempt::AlreadyRunning);
        };

        let pending = self.lock().pending.clone();
        let (raw_message, candidate) = match pending {
            Some(p) if index < p.candidates.len() => (p.raw_message, p.candidates[index].clone()),
            other => {
                return Err(IntakeError::NoSuchCandidate {
                    index,
                    available: other.map(|p| p.candidates.len()).unwrap_or(0),
                }
                .into());
            }
        };

        let report = self.create(&candidate, &raw_message).await?;
        Ok(Attempt::Ran(report))
    }

    /// Drop staged text, image and pending candidates.
    pub fn clear(&self) {
        *self.lock() = Staged::default();
    }

    async fn create(
        &self,
        candidate: &ReportCandidate,
        raw_message: &str,
    ) -> Result<Report, RescueError> {
        let payload = report_from_candidate(candidate, raw_message, &self.defaults);
        let report = self.store.insert(&payload).await.map_err(|e| {
            warn!("Saving report failed: {}", e);
            RescueError::from(e)
        })?;

        info!("Created report {}", report.id);
        self.clear();
        Ok(report)
    }

    fn lock(&self) -> MutexGuard<'_, Staged> {
        self.staged.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ServiceError, StoreError};
    use crate::models::report::{NewReport, ReportUpdate};
    use crate::service::NO_TEXT_SENTINEL;
    use crate::store::MemoryReportStore;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    fn candidate(name: &str) -> ReportCandidate {
        ReportCandidate {
            name: Some(name.to_string()),
            phone: vec!["0812345678".to_string()],
            ..ReportCandidate::default()
        }
    }

    #[derive(Default)]
    struct FakeExtractor {
        reports: Vec<ReportCandidate>,
        fail: bool,
        calls: AtomicUsize,
        received: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ExtractionClient for FakeExtractor {
        async fn extract(&self, raw_message: &str) -> Result<Extraction, ServiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.received.lock().unwrap().push(raw_message.to_string());
            if self.fail {
                return Err(ServiceError::Remote("model overloaded".to_string()));
            }
            Ok(Extraction::from_candidates(self.reports.clone()))
        }
    }

    #[derive(Default)]
    struct FakeOcr {
        text: Option<String>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl OcrClient for FakeOcr {
        async fn recognize(&self, _image: &ImagePayload) -> Result<OcrText, ServiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(match &self.text {
                Some(text) => OcrText::from_raw(text, NO_TEXT_SENTINEL),
                None => OcrText::NoText,
            })
        }
    }

    /// Parks inside `extract` until released.
    #[derive(Default)]
    struct SlowExtractor {
        started: Notify,
        release: Notify,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ExtractionClient for SlowExtractor {
        async fn extract(&self, _raw_message: &str) -> Result<Extraction, ServiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.started.notify_one();
            self.release.notified().await;
            Ok(Extraction::Empty)
        }
    }

    struct RejectingStore;

    #[async_trait]
    impl ReportStore for RejectingStore {
        async fn insert(&self, _report: &NewReport) -> Result<Report, StoreError> {
            Err(StoreError::Rejected {
                message: "new row violates row-level security policy".to_string(),
            })
        }

        async fn get(&self, id: &str) -> Result<Report, StoreError> {
            Err(StoreError::NotFound(id.to_string()))
        }

        async fn update(&self, id: &str, _update: &ReportUpdate) -> Result<Report, StoreError> {
            Err(StoreError::NotFound(id.to_string()))
        }
    }

    fn session_with(
        extractor: Arc<dyn ExtractionClient>,
        ocr: Arc<dyn OcrClient>,
        store: Arc<dyn ReportStore>,
    ) -> IntakeSession {
        IntakeSession::new(extractor, ocr, store)
    }

    fn png(bytes: usize) -> ImagePayload {
        ImagePayload::new("image/png", vec![0u8; bytes])
    }

    #[tokio::test]
    async fn test_empty_text_rejected_before_extraction() {
        let extractor = Arc::new(FakeExtractor::default());
        let session = session_with(
            extractor.clone(),
            Arc::new(FakeOcr::default()),
            Arc::new(MemoryReportStore::new()),
        );

        session.stage_text(" \u{200B}\n ");
        let err = session.submit().await.unwrap_err();
        assert!(matches!(err, RescueError::Intake(IntakeError::EmptyInput)));
        assert_eq!(extractor.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_single_candidate_is_stored() {
        let extractor = Arc::new(FakeExtractor {
            reports: vec![candidate("สมชาย")],
            ..FakeExtractor::default()
        });
        let store = Arc::new(MemoryReportStore::new());
        let session = session_with(extractor.clone(), Arc::new(FakeOcr::default()), store.clone());

        session.stage_text("  ช่วยด้วย   น้ำท่วม  ");
        let outcome = session.submit().await.unwrap();

        let Attempt::Ran(SubmitOutcome::Created(report)) = outcome else {
            panic!("expected a created report, got {:?}", outcome);
        };
        assert_eq!(report.raw_message, "ช่วยด้วย น้ำท่วม");
        assert_eq!(report.fields.name, "สมชาย");
        assert_eq!(report.fields.phone, vec!["081-234-5678"]);
        assert_eq!(store.len(), 1);
        assert_eq!(
            extractor.received.lock().unwrap().as_slice(),
            ["ช่วยด้วย น้ำท่วม".to_string()]
        );
        assert_eq!(session.staged_text(), "");
    }

    #[tokio::test]
    async fn test_empty_extraction_keeps_text() {
        let store = Arc::new(MemoryReportStore::new());
        let session = session_with(
            Arc::new(FakeExtractor::default()),
            Arc::new(FakeOcr::default()),
            store.clone(),
        );

        session.stage_text("สวัสดี");
        let outcome = session.submit().await.unwrap();
        assert_eq!(outcome, Attempt::Ran(SubmitOutcome::NothingExtracted));
        assert_eq!(session.staged_text(), "สวัสดี");
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_multiple_candidates_wait_for_choice() {
        let extractor = Arc::new(FakeExtractor {
            reports: vec![candidate("A"), candidate("B"), candidate("C")],
            ..FakeExtractor::default()
        });
        let store = Arc::new(MemoryReportStore::new());
        let session = session_with(extractor, Arc::new(FakeOcr::default()), store.clone());

        session.stage_text("สามครอบครัวติดอยู่");
        let outcome = session.submit().await.unwrap();
        let Attempt::Ran(SubmitOutcome::ChooseCandidate(candidates)) = outcome else {
            panic!("expected a choice");
        };
        assert_eq!(candidates.len(), 3);
        assert!(store.is_empty());
        assert_eq!(session.pending_candidates().len(), 3);

        let err = session.finalize_candidate(3).await.unwrap_err();
        assert!(matches!(
            err,
            RescueError::Intake(IntakeError::NoSuchCandidate { index: 3, available: 3 })
        ));

        let report = session.finalize_candidate(1).await.unwrap().ran().unwrap();
        assert_eq!(report.fields.name, "B");
        assert_eq!(report.raw_message, "สามครอบครัวติดอยู่");
        assert_eq!(store.len(), 1);
        assert!(session.pending_candidates().is_empty());
    }

    #[tokio::test]
    async fn test_finalize_without_pending() {
        let session = session_with(
            Arc::new(FakeExtractor::default()),
            Arc::new(FakeOcr::default()),
            Arc::new(MemoryReportStore::new()),
        );
        let err = session.finalize_candidate(0).await.unwrap_err();
        assert!(matches!(
            err,
            RescueError::Intake(IntakeError::NoSuchCandidate { index: 0, available: 0 })
        ));
    }

    #[tokio::test]
    async fn test_extraction_failure_releases_gate() {
        let extractor = Arc::new(FakeExtractor {
            fail: true,
            ..FakeExtractor::default()
        });
        let session = session_with(
            extractor.clone(),
            Arc::new(FakeOcr::default()),
            Arc::new(MemoryReportStore::new()),
        );

        session.stage_text("ข้อความ");
        assert!(matches!(session.submit().await, Err(RescueError::Service(_))));
        assert!(!session.is_busy());
        assert_eq!(session.staged_text(), "ข้อความ");

        assert!(session.submit().await.is_err());
        assert_eq!(extractor.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_store_rejection_surfaces_message() {
        let extractor = Arc::new(FakeExtractor {
            reports: vec![candidate("A")],
            ..FakeExtractor::default()
        });
        let session = session_with(extractor, Arc::new(FakeOcr::default()), Arc::new(RejectingStore));

        session.stage_text("ข้อความ");
        let err = session.submit().await.unwrap_err();
        assert!(err.to_string().contains("row-level security"));
        assert_eq!(session.staged_text(), "ข้อความ");
        assert!(!session.is_busy());
    }

    #[tokio::test]
    async fn test_concurrent_submit_is_refused() {
        let extractor = Arc::new(SlowExtractor::default());
        let session = session_with(
            extractor.clone(),
            Arc::new(FakeOcr::default()),
            Arc::new(MemoryReportStore::new()),
        );
        session.stage_text("ช่วยด้วย");

        let (first, second) = tokio::join!(session.submit(), async {
            extractor.started.notified().await;
            let second = session.submit().await;
            extractor.release.notify_one();
            second
        });

        assert_eq!(first.unwrap(), Attempt::Ran(SubmitOutcome::NothingExtracted));
        assert!(second.unwrap().is_already_running());
        assert_eq!(extractor.calls.load(Ordering::SeqCst), 1);
        assert!(!session.is_busy());
    }

    #[tokio::test]
    async fn test_ocr_text_appended_after_blank_line() {
        let ocr = Arc::new(FakeOcr {
            text: Some("บ้านเลขที่ 12\u{200B}  หมู่ 3".to_string()),
            ..FakeOcr::default()
        });
        let session = session_with(
            Arc::new(FakeExtractor::default()),
            ocr.clone(),
            Arc::new(MemoryReportStore::new()),
        );

        session.stage_text("ต้องการเรือ");
        let result = session.attach_image(png(128)).await.unwrap();
        assert_eq!(
            result,
            Attempt::Ran(OcrText::Text("บ้านเลขที่ 12 หมู่ 3".to_string()))
        );
        assert_eq!(session.staged_text(), "ต้องการเรือ\n\nบ้านเลขที่ 12 หมู่ 3");
        assert!(session.staged_image().is_some());
    }

    #[tokio::test]
    async fn test_ocr_no_text_leaves_staged_text() {
        let session = session_with(
            Arc::new(FakeExtractor::default()),
            Arc::new(FakeOcr::default()),
            Arc::new(MemoryReportStore::new()),
        );

        session.stage_text("ต้องการเรือ");
        let result = session.attach_image(png(16)).await.unwrap();
        assert_eq!(result, Attempt::Ran(OcrText::NoText));
        assert_eq!(session.staged_text(), "ต้องการเรือ");
    }

    #[tokio::test]
    async fn test_invalid_image_never_reaches_ocr() {
        let ocr = Arc::new(FakeOcr::default());
        let session = session_with(
            Arc::new(FakeExtractor::default()),
            ocr.clone(),
            Arc::new(MemoryReportStore::new()),
        )
        .with_limits(ImageLimits { max_bytes: 64 });

        let err = session.attach_image(png(65)).await.unwrap_err();
        assert!(matches!(
            err,
            RescueError::Intake(IntakeError::ImageTooLarge { size: 65, max: 64 })
        ));

        let pdf = ImagePayload::new("application/pdf", vec![0u8; 8]);
        let err = session.attach_image(pdf).await.unwrap_err();
        assert!(matches!(err, RescueError::Intake(IntakeError::UnsupportedMediaType(_))));

        assert_eq!(ocr.calls.load(Ordering::SeqCst), 0);
        assert!(session.staged_image().is_none());
    }

    #[tokio::test]
    async fn test_clear() {
        let session = session_with(
            Arc::new(FakeExtractor::default()),
            Arc::new(FakeOcr {
                text: Some("x".to_string()),
                ..FakeOcr::default()
            }),
            Arc::new(MemoryReportStore::new()),
        );
        session.stage_text("y");
        session.attach_image(png(4)).await.unwrap();
        session.clear();
        assert_eq!(session.staged_text(), "");
        assert!(session.staged_image().is_none());
    }
}
