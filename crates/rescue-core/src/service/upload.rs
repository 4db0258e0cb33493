//! Image payloads for the OCR function and their client-side checks.

use base64::{engine::general_purpose::STANDARD, Engine};

use crate::error::IntakeError;

/// Upload limit enforced before any OCR call (10 MiB).
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Client-side image constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageLimits {
    pub max_bytes: usize,
}

impl Default for ImageLimits {
    fn default() -> Self {
        Self {
            max_bytes: MAX_IMAGE_BYTES,
        }
    }
}

/// Check media type and size of an upload.
pub fn validate_image(mime_type: &str, size: usize, limits: &ImageLimits) -> Result<(), IntakeError> {
    if !mime_type.trim().to_ascii_lowercase().starts_with("image/") {
        return Err(IntakeError::UnsupportedMediaType(mime_type.to_string()));
    }
    if size > limits.max_bytes {
        return Err(IntakeError::ImageTooLarge {
            size,
            max: limits.max_bytes,
        });
    }
    Ok(())
}

/// Media type for an image file extension.
///
/// Covers formats phones and browsers produce that `image` cannot decode,
/// such as HEIC and SVG.
pub fn mime_from_extension(extension: &str) -> Option<&'static str> {
    let mime = match extension.trim_start_matches('.').to_ascii_lowercase().as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" | "jfif" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "heic" => "image/heic",
        "heif" => "image/heif",
        "avif" => "image/avif",
        "svg" => "image/svg+xml",
        _ => return None,
    };
    Some(mime)
}

/// Raw image bytes with their media type.
#[derive(Clone, PartialEq, Eq)]
pub struct ImagePayload {
    mime_type: String,
    data: Vec<u8>,
}

impl ImagePayload {
    /// Wrap bytes with a declared media type.
    pub fn new(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data,
        }
    }

    /// Wrap bytes, detecting the media type from their signature.
    pub fn sniff(data: Vec<u8>) -> Result<Self, IntakeError> {
        let format = image::guess_format(&data).map_err(|_| {
            IntakeError::UnsupportedMediaType("application/octet-stream".to_string())
        })?;
        Ok(Self::new(format.to_mime_type(), data))
    }

    /// Like [`sniff`](Self::sniff), falling back to the file extension when
    /// the signature is not one `image` recognizes.
    pub fn sniff_or_extension(data: Vec<u8>, extension: Option<&str>) -> Result<Self, IntakeError> {
        if let Ok(format) = image::guess_format(&data) {
            return Ok(Self::new(format.to_mime_type(), data));
        }
        match extension.and_then(mime_from_extension) {
            Some(mime_type) => Ok(Self::new(mime_type, data)),
            None => Err(IntakeError::UnsupportedMediaType(
                extension.map_or("application/octet-stream".to_string(), |ext| format!(".{}", ext)),
            )),
        }
    }

    /// Decode a `data:<mime>;base64,<payload>` URL.
    pub fn from_data_url(url: &str) -> Result<Self, IntakeError> {
        let invalid = |reason: &str| IntakeError::InvalidDataUrl(reason.to_string());

        let rest = url.strip_prefix("data:").ok_or_else(|| invalid("missing data: prefix"))?;
        let (header, payload) = rest.split_once(',').ok_or_else(|| invalid("missing payload"))?;
        let mime_type = header
            .strip_suffix(";base64")
            .ok_or_else(|| invalid("payload is not base64"))?;
        let data = STANDARD
            .decode(payload.trim())
            .map_err(|e| IntakeError::InvalidDataUrl(e.to_string()))?;

        Ok(Self::new(mime_type, data))
    }

    /// Apply the client-side constraints.
    pub fn validate(&self, limits: &ImageLimits) -> Result<(), IntakeError> {
        validate_image(&self.mime_type, self.data.len(), limits)
    }

    /// Encode as a base64 data URL, the OCR function's input format.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.data))
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl std::fmt::Debug for ImagePayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImagePayload")
            .field("mime_type", &self.mime_type)
            .field("len", &self.data.len())
            .finish()
    }
}
