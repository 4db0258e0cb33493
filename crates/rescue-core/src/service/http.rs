//! HTTP client for the backend's remote functions.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use super::{
    decode_extraction, decode_ocr, ExtractRequest, Extraction, ExtractionClient, ImagePayload,
    OcrClient, OcrRequest, OcrText,
};
use crate::error::{RescueError, ServiceError};
use crate::models::config::ServiceConfig;

/// Calls `POST <base_url>/functions/v1/<name>` for extraction and OCR.
pub struct FunctionsClient {
    base_url: String,
    api_key: Option<String>,
    extract_function: String,
    ocr_function: String,
    no_text_sentinel: String,
    client: reqwest::Client,
}

impl FunctionsClient {
    /// Build a client from configuration.
    pub fn from_config(config: &ServiceConfig) -> Result<Self, RescueError> {
        let mut builder = reqwest::Client::builder();
        if config.timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(config.timeout_secs));
        }
        let client = builder
            .build()
            .map_err(|e| RescueError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            extract_function: config.extract_function.clone(),
            ocr_function: config.ocr_function.clone(),
            no_text_sentinel: config.no_text_sentinel.clone(),
            client,
        })
    }

    /// URL of a named function.
    pub fn function_url(&self, name: &str) -> String {
        format!("{}/functions/v1/{}", self.base_url, name)
    }

    async fn invoke<B: Serialize + Sync>(&self, name: &str, body: &B) -> Result<Value, ServiceError> {
        let url = self.function_url(name);
        debug!("Invoking function {}", url);

        let mut request = self.client.post(&url).json(body);
        if let Some(key) = &self.api_key {
            request = request.header("apikey", key).bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ServiceError::Status {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        Ok(response.json::<Value>().await?)
    }
}

/// Pull `error`/`message` out of a JSON error body, else use the raw text.
pub(crate) fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .or_else(|| v.get("message"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

#[async_trait]
impl ExtractionClient for FunctionsClient {
    async fn extract(&self, raw_message: &str) -> Result<Extraction, ServiceError> {
        let body = self
            .invoke(&self.extract_function, &ExtractRequest { raw_message })
            .await?;
        let extraction = decode_extraction(body)?;
        info!("Extraction returned {} candidate(s)", extraction.len());
        Ok(extraction)
    }
}

#[async_trait]
impl OcrClient for FunctionsClient {
    async fn recognize(&self, image: &ImagePayload) -> Result<OcrText, ServiceError> {
        debug!("Sending {} ({} bytes) to OCR", image.mime_type(), image.len());
        let request = OcrRequest {
            image: image.to_data_url(),
        };
        let body = self.invoke(&self.ocr_function, &request).await?;
        decode_ocr(body, &self.no_text_sentinel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_function_url() {
        let config = ServiceConfig {
            base_url: "https://abc.supabase.co/".to_string(),
            ..ServiceConfig::default()
        };
        let client = FunctionsClient::from_config(&config).unwrap();
        assert_eq!(
            client.function_url("extract-report"),
            "https://abc.supabase.co/functions/v1/extract-report"
        );
    }

    #[test]
    fn test_error_message() {
        assert_eq!(error_message(r#"{"error": "rate limited"}"#), "rate limited");
        assert_eq!(error_message(r#"{"message": "JWT expired"}"#), "JWT expired");
        assert_eq!(error_message(" upstream timeout \n"), "upstream timeout");
    }
}
