//! Core library for disaster-report intake.
//!
//! This crate provides:
//! - Text normalization for pasted, typed and OCR-derived text
//! - Thai phone number formatting
//! - Extraction and OCR service clients (remote functions on the backend)
//! - The report merge/edit pipeline producing store-ready records
//! - Report persistence (REST table and in-memory)
//! - Per-screen intake and edit sessions with a single-flight gate

pub mod error;
pub mod models;
pub mod report;
pub mod service;
pub mod session;
pub mod store;
pub mod text;

pub use error::{IntakeError, RescueError, Result, ServiceError, StoreError};
pub use models::report::{
    HelpCategories, HelpCategory, NewReport, Report, ReportCandidate, ReportUpdate, UrgencyLevel,
};
pub use report::{report_from_candidate, ReportDefaults, ReportDraft};
pub use service::{Extraction, ExtractionClient, ImagePayload, OcrClient, OcrText};
pub use session::{Attempt, EditSession, FlightGate, IntakeSession, SubmitOutcome};
pub use store::{MemoryReportStore, ReportStore};
pub use text::{append_staged, format_phone, normalize_text, split_phones};

#[cfg(feature = "native")]
pub use service::http::FunctionsClient;
#[cfg(feature = "native")]
pub use store::rest::RestReportStore;
