//! Configuration structures for the intake pipeline.

use serde::{Deserialize, Serialize};

use crate::models::report::DEFAULT_STATUS;
use crate::report::ReportDefaults;
use crate::service::{ImageLimits, MAX_IMAGE_BYTES, NO_TEXT_SENTINEL};

/// Environment variable overriding `service.base_url`.
pub const ENV_BASE_URL: &str = "RESCUE_BASE_URL";

/// Environment variable overriding `service.api_key`.
pub const ENV_API_KEY: &str = "RESCUE_API_KEY";

/// Main configuration for the rescue pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RescueConfig {
    /// Backend functions configuration.
    pub service: ServiceConfig,

    /// Client-side intake rules.
    pub intake: IntakeConfig,

    /// Report table configuration.
    pub store: StoreConfig,
}

/// Managed backend (remote functions) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Project base URL, e.g. `https://xyz.supabase.co`.
    pub base_url: String,

    /// Anon or service key sent as `apikey` and bearer token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Name of the text extraction function.
    pub extract_function: String,

    /// Name of the OCR function.
    pub ocr_function: String,

    /// Text the OCR function returns when nothing is legible.
    pub no_text_sentinel: String,

    /// HTTP timeout in seconds (0 = none).
    pub timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:54321".to_string(),
            api_key: None,
            extract_function: "extract-report".to_string(),
            ocr_function: "ocr-image".to_string(),
            no_text_sentinel: NO_TEXT_SENTINEL.to_string(),
            timeout_secs: 0,
        }
    }
}

/// Client-side intake rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IntakeConfig {
    /// Largest accepted image upload in bytes.
    pub max_image_bytes: usize,

    /// Status given to newly created reports.
    pub default_status: String,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            max_image_bytes: MAX_IMAGE_BYTES,
            default_status: DEFAULT_STATUS.to_string(),
        }
    }
}

impl IntakeConfig {
    pub fn image_limits(&self) -> ImageLimits {
        ImageLimits {
            max_bytes: self.max_image_bytes,
        }
    }

    pub fn report_defaults(&self) -> ReportDefaults {
        ReportDefaults {
            status: self.default_status.clone(),
        }
    }
}

/// Report table configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Table name under `/rest/v1/`.
    pub table: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            table: "reports".to_string(),
        }
    }
}

impl RescueConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }

    /// Apply `RESCUE_BASE_URL` / `RESCUE_API_KEY` when set.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(
            std::env::var(ENV_BASE_URL).ok(),
            std::env::var(ENV_API_KEY).ok(),
        )
    }

    fn with_overrides(mut self, base_url: Option<String>, api_key: Option<String>) -> Self {
        if let Some(url) = base_url.filter(|u| !u.trim().is_empty()) {
            self.service.base_url = url;
        }
        if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
            self.service.api_key = Some(key);
        }
        self
    }
}
