//! Error types for the rescue-core library.

use thiserror::Error;

/// Main error type for the rescue library.
#[derive(Error, Debug)]
pub enum RescueError {
    /// Input rejected before any network call.
    #[error("intake error: {0}")]
    Intake(#[from] IntakeError),

    /// Extraction or OCR service error.
    #[error("service error: {0}")]
    Service(#[from] ServiceError),

    /// Persistence error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Validation failures caught locally.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntakeError {
    /// Nothing staged to submit.
    #[error("no text to submit")]
    EmptyInput,

    /// Image exceeds the upload limit.
    #[error("image is {size} bytes, limit is {max} bytes")]
    ImageTooLarge { size: usize, max: usize },

    /// Payload is not an image.
    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// Malformed `data:` URL.
    #[error("invalid data URL: {0}")]
    InvalidDataUrl(String),

    /// Candidate selection out of range.
    #[error("no candidate at index {index} ({available} available)")]
    NoSuchCandidate { index: usize, available: usize },

    /// Edit targets a field the form does not have.
    #[error("unknown report field: {0}")]
    UnknownField(String),

    /// Edit value outside what the form offers (e.g. an unknown category).
    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },
}

/// Errors reported by the extraction and OCR functions.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Transport failure.
    #[cfg(feature = "native")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status code.
    #[error("service returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The function answered with an `error` body.
    #[error("{0}")]
    Remote(String),

    /// Response body did not match the contract.
    #[error("unexpected response: {0}")]
    Decode(String),
}

/// Errors reported by the report store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No report with this id.
    #[error("report not found: {0}")]
    NotFound(String),

    /// The backend refused the write; message is passed through verbatim.
    #[error("{message}")]
    Rejected { message: String },

    /// Transport failure.
    #[cfg(feature = "native")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body did not match the table schema.
    #[error("unexpected response: {0}")]
    Decode(String),
}

/// Result type for the rescue library.
pub type Result<T> = std::result::Result<T, RescueError>;
