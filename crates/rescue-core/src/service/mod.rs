//! Clients for the extraction and OCR remote functions.
//!
//! The services themselves are opaque; this module owns their request and
//! response contracts and the post-processing the intake pipeline applies to
//! every response (phone formatting, text normalization, cardinality routing).

#[cfg(feature = "native")]
pub mod http;
mod upload;

pub use upload::{mime_from_extension, validate_image, ImageLimits, ImagePayload, MAX_IMAGE_BYTES};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ServiceError;
use crate::models::report::ReportCandidate;
use crate::text::{normalize_text, split_phones};

/// Text the OCR function returns when the image has nothing legible.
pub const NO_TEXT_SENTINEL: &str = "NO_TEXT_FOUND";

/// Result of an extraction call, by number of candidates found.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    /// Nothing extractable in the text.
    Empty,
    /// Exactly one report: go straight to review.
    Single(ReportCandidate),
    /// Several reports: the user picks before anything is finalized.
    Multiple(Vec<ReportCandidate>),
}

impl Extraction {
    /// Route a candidate list by cardinality, formatting every phone first.
    pub fn from_candidates(candidates: Vec<ReportCandidate>) -> Self {
        let mut candidates: Vec<ReportCandidate> =
            candidates.into_iter().map(format_candidate_phones).collect();

        match candidates.len() {
            0 => Extraction::Empty,
            1 => Extraction::Single(candidates.remove(0)),
            _ => Extraction::Multiple(candidates),
        }
    }

    /// Number of candidates.
    pub fn len(&self) -> usize {
        match self {
            Extraction::Empty => 0,
            Extraction::Single(_) => 1,
            Extraction::Multiple(candidates) => candidates.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Extraction::Empty)
    }

    pub fn into_candidates(self) -> Vec<ReportCandidate> {
        match self {
            Extraction::Empty => Vec::new(),
            Extraction::Single(candidate) => vec![candidate],
            Extraction::Multiple(candidates) => candidates,
        }
    }
}

fn format_candidate_phones(mut candidate: ReportCandidate) -> ReportCandidate {
    candidate.phone = candidate.phone.iter().flat_map(|p| split_phones(p)).collect();
    candidate
}

/// Result of an OCR call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OcrText {
    /// Normalized recognized text, never empty.
    Text(String),
    /// The service found nothing legible.
    NoText,
}

impl OcrText {
    /// Interpret raw OCR output: the sentinel or blank text means nothing
    /// was found, anything else is normalized.
    pub fn from_raw(raw: &str, sentinel: &str) -> Self {
        if raw.trim() == sentinel {
            return OcrText::NoText;
        }
        let text = normalize_text(raw);
        if text.is_empty() {
            OcrText::NoText
        } else {
            OcrText::Text(text)
        }
    }
}

/// Sends normalized text to the extraction service.
#[async_trait]
pub trait ExtractionClient: Send + Sync {
    /// Extract zero or more report candidates from one text blob.
    async fn extract(&self, raw_message: &str) -> Result<Extraction, ServiceError>;
}

/// Sends images to the OCR service.
#[async_trait]
pub trait OcrClient: Send + Sync {
    /// Recognize the text in an already validated image.
    async fn recognize(&self, image: &ImagePayload) -> Result<OcrText, ServiceError>;
}

/// Extraction request body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractRequest<'a> {
    pub raw_message: &'a str,
}

/// OCR request body.
#[derive(Debug, Serialize)]
pub struct OcrRequest {
    /// Base64 data URL.
    pub image: String,
}

#[derive(Debug, Deserialize)]
struct ExtractResponse {
    #[serde(default)]
    reports: Option<Vec<ReportCandidate>>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OcrResponse {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Decode an extraction response body.
///
/// `{"error": ...}` is a service failure; `{"reports": []}` is the distinct
/// empty outcome.
pub fn decode_extraction(body: Value) -> Result<Extraction, ServiceError> {
    let response: ExtractResponse =
        serde_json::from_value(body).map_err(|e| ServiceError::Decode(e.to_string()))?;

    if let Some(error) = response.error.filter(|e| !e.trim().is_empty()) {
        return Err(ServiceError::Remote(error));
    }

    let reports = response
        .reports
        .ok_or_else(|| ServiceError::Decode("missing `reports`".to_string()))?;

    Ok(Extraction::from_candidates(reports))
}

/// Decode an OCR response body.
pub fn decode_ocr(body: Value, sentinel: &str) -> Result<OcrText, ServiceError> {
    let response: OcrResponse =
        serde_json::from_value(body).map_err(|e| ServiceError::Decode(e.to_string()))?;

    if let Some(error) = response.error.filter(|e| !e.trim().is_empty()) {
        return Err(ServiceError::Remote(error));
    }

    let text = response
        .text
        .ok_or_else(|| ServiceError::Decode("missing `text`".to_string()))?;

    Ok(OcrText::from_raw(&text, sentinel))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_cardinality_routing() {
        assert_eq!(decode_extraction(json!({"reports": []})).unwrap(), Extraction::Empty);

        let single = decode_extraction(json!({"reports": [{"name": "A"}]})).unwrap();
        assert!(matches!(single, Extraction::Single(ref c) if c.name.as_deref() == Some("A")));

        let multiple =
            decode_extraction(json!({"reports": [{"name": "A"}, {"name": "B"}, {}]})).unwrap();
        assert!(matches!(multiple, Extraction::Multiple(ref cs) if cs.len() == 3));
        assert_eq!(multiple.len(), 3);
    }

    #[test]
    fn test_error_body_is_failure() {
        let err = decode_extraction(json!({"error": "quota exceeded"})).unwrap_err();
        assert!(matches!(err, ServiceError::Remote(ref m) if m == "quota exceeded"));

        let err = decode_extraction(json!({"unexpected": true})).unwrap_err();
        assert!(matches!(err, ServiceError::Decode(_)));
    }

    #[test]
    fn test_phones_formatted_at_boundary() {
        let extraction = decode_extraction(json!({
            "reports": [{"phone": ["0811111111", "+66822222222, 1669"]}]
        }))
        .unwrap();

        let Extraction::Single(candidate) = extraction else {
            panic!("expected a single candidate");
        };
        assert_eq!(candidate.phone, vec!["081-111-1111", "082-222-2222", "1669"]);
    }

    #[test]
    fn test_decode_ocr() {
        assert_eq!(
            decode_ocr(json!({"text": "  บ้าน\u{200B}  น้ำท่วม "}), NO_TEXT_SENTINEL).unwrap(),
            OcrText::Text("บ้าน น้ำท่วม".to_string())
        );
        assert_eq!(
            decode_ocr(json!({"text": "NO_TEXT_FOUND"}), NO_TEXT_SENTINEL).unwrap(),
            OcrText::NoText
        );
        assert_eq!(
            decode_ocr(json!({"text": " \u{200B} "}), NO_TEXT_SENTINEL).unwrap(),
            OcrText::NoText
        );
        assert!(decode_ocr(json!({"error": "bad image"}), NO_TEXT_SENTINEL).is_err());
    }

    #[test]
    fn test_request_shapes() {
        let body = serde_json::to_value(ExtractRequest { raw_message: "hi" }).unwrap();
        assert_eq!(body, json!({"rawMessage": "hi"}));

        let body = serde_json::to_value(OcrRequest {
            image: "data:image/png;base64,AA==".to_string(),
        })
        .unwrap();
        assert_eq!(body, json!({"image": "data:image/png;base64,AA=="}));
    }
}
