//! WASM bindings for disaster-report intake.
//!
//! Exposes the offline parts of the pipeline (normalization, phone
//! formatting, image checks, candidate merging and the edit form) to
//! browsers and Node.js. Network calls stay on the JavaScript side.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use rescue_core::models::report::{HelpCategory, Report, ReportCandidate};
use rescue_core::service::{validate_image as check_image, Extraction, ImageLimits, MAX_IMAGE_BYTES};
use rescue_core::{report_from_candidate, ReportDefaults, ReportDraft};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn js_error(message: impl std::fmt::Display) -> JsValue {
    js_sys::Error::new(&message.to_string()).into()
}

// Plain objects and `null` for `None`, so results can go straight into
// `JSON.stringify` or a REST body.
fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(js_error)
}

/// Clean up pasted, typed or OCR text.
#[wasm_bindgen]
pub fn normalize_text(text: &str) -> String {
    rescue_core::normalize_text(text)
}

/// Format one Thai phone number for display.
#[wasm_bindgen]
pub fn format_phone(phone: &str) -> String {
    rescue_core::format_phone(phone)
}

/// Split a comma-separated phone list and format each entry.
#[wasm_bindgen]
pub fn split_phones(phones: &str) -> Vec<String> {
    rescue_core::split_phones(phones)
}

/// Append OCR text to the staged text after a blank line.
#[wasm_bindgen]
pub fn append_staged(existing: &str, addition: &str) -> String {
    rescue_core::append_staged(existing, addition)
}

/// Upload limit in bytes.
#[wasm_bindgen]
pub fn max_image_bytes() -> usize {
    MAX_IMAGE_BYTES
}

/// Check an image's media type and size before uploading it.
#[wasm_bindgen]
pub fn validate_image(mime_type: &str, size: usize) -> Result<(), JsValue> {
    check_image(mime_type, size, &ImageLimits::default()).map_err(js_error)
}

/// Build the insert payload for an extracted candidate.
#[wasm_bindgen]
pub fn candidate_to_report(candidate: JsValue, raw_message: &str) -> Result<JsValue, JsValue> {
    let candidate: ReportCandidate = serde_wasm_bindgen::from_value(candidate).map_err(js_error)?;
    let report = report_from_candidate(&candidate, raw_message, &ReportDefaults::default());
    to_js(&report)
}

#[derive(Serialize)]
struct Routed {
    kind: &'static str,
    candidates: Vec<ReportCandidate>,
}

/// Route an extraction response's `reports` array by count.
///
/// Returns `{ kind: "empty" | "single" | "multiple", candidates }` with every
/// phone already formatted.
#[wasm_bindgen]
pub fn route_candidates(reports: JsValue) -> Result<JsValue, JsValue> {
    let reports: Vec<ReportCandidate> = serde_wasm_bindgen::from_value(reports).map_err(js_error)?;

    let extraction = Extraction::from_candidates(reports);
    let kind = match &extraction {
        Extraction::Empty => "empty",
        Extraction::Single(_) => "single",
        Extraction::Multiple(_) => "multiple",
    };

    to_js(&Routed {
        kind,
        candidates: extraction.into_candidates(),
    })
}

/// Edit form state for one stored report.
#[wasm_bindgen]
pub struct DraftEditor {
    draft: ReportDraft,
}

#[wasm_bindgen]
impl DraftEditor {
    /// Start with an empty form.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            draft: ReportDraft::default(),
        }
    }

    /// Prefill the form from a stored report row.
    #[wasm_bindgen(js_name = fromReport)]
    pub fn from_report(report: JsValue) -> Result<DraftEditor, JsValue> {
        let report: Report = serde_wasm_bindgen::from_value(report).map_err(js_error)?;
        Ok(Self {
            draft: ReportDraft::from_report(&report),
        })
    }

    /// Set one field by its column name.
    #[wasm_bindgen(js_name = setField)]
    pub fn set_field(&mut self, field: &str, value: &str) -> Result<(), JsValue> {
        self.draft.set_field(field, value).map_err(js_error)
    }

    /// Flip a help category. Returns whether it is now selected.
    #[wasm_bindgen(js_name = toggleCategory)]
    pub fn toggle_category(&mut self, tag: &str) -> Result<bool, JsValue> {
        let category = HelpCategory::parse(tag)
            .ok_or_else(|| js_error(format!("unknown help category: {}", tag)))?;
        Ok(self.draft.toggle_category(category))
    }

    /// Current form values.
    #[wasm_bindgen]
    pub fn draft(&self) -> Result<JsValue, JsValue> {
        to_js(&self.draft)
    }

    /// The merged update payload to send to the report table.
    #[wasm_bindgen(js_name = toUpdate)]
    pub fn to_update(&self) -> Result<JsValue, JsValue> {
        to_js(&self.draft.to_update())
    }
}

impl Default for DraftEditor {
    fn default() -> Self {
        Self::new()
    }
}

/// Selectable help category tags, in display order.
#[wasm_bindgen]
pub fn help_categories() -> Vec<String> {
    HelpCategory::ALL.iter().map(|c| c.as_str().to_string()).collect()
}
