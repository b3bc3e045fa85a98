//! Core types for text and image generation.

use crate::config::GenerationConfig;
use crate::error::ExtractionError;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// An output kind requested from the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Modality {
    /// Text output.
    Text,
    /// Image output.
    Image,
}

impl Modality {
    /// Returns the wire name (e.g. "TEXT").
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "TEXT",
            Self::Image => "IMAGE",
        }
    }
}

impl std::fmt::Display for Modality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A prompt plus the generation parameters sent with it.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// The text prompt.
    pub prompt: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Cap on generated tokens.
    pub max_output_tokens: u32,
    /// Requested output kinds, without duplicates.
    pub response_modalities: Vec<Modality>,
}

impl GenerationRequest {
    /// Builds a request from a prompt and the parameters in `config`.
    pub fn new(prompt: impl Into<String>, config: &GenerationConfig) -> Self {
        let mut response_modalities: Vec<Modality> = Vec::with_capacity(2);
        for modality in &config.modalities {
            if !response_modalities.contains(modality) {
                response_modalities.push(*modality);
            }
        }

        Self {
            prompt: prompt.into(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
            response_modalities,
        }
    }
}

/// An image returned inline by the service, still base64-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    /// MIME type reported by the service.
    pub mime_type: String,
    /// Base64 payload.
    pub data: String,
}

impl InlineImage {
    /// Creates an inline image from its mime type and base64 payload.
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    /// Decodes the base64 payload into raw bytes.
    pub fn decode(&self) -> Result<Vec<u8>, ExtractionError> {
        base64::engine::general_purpose::STANDARD
            .decode(self.data.trim())
            .map_err(|e| ExtractionError::Decode(e.to_string()))
    }
}

/// Read-only view over a model reply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateResponse {
    /// Concatenated text parts, if any.
    pub text: Option<String>,
    /// Image parts. `None` when the reply had no content at all.
    pub images: Option<Vec<InlineImage>>,
}

impl GenerateResponse {
    /// Creates a text-only response.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            images: Some(Vec::new()),
        }
    }

    /// Adds an inline image to the response.
    pub fn with_image(mut self, image: InlineImage) -> Self {
        self.images.get_or_insert_with(Vec::new).push(image);
        self
    }
}

/// What a generation call hands back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[must_use = "generated result should be printed or processed"]
pub struct GeneratedResult {
    /// Trimmed text, with an image-saved marker appended when an image was written.
    pub text: String,
    /// Where the first image was saved, if one was.
    pub image_path: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modality_as_str() {
        assert_eq!(Modality::Text.as_str(), "TEXT");
        assert_eq!(Modality::Image.to_string(), "IMAGE");
    }

    #[test]
    fn test_modality_serializes_uppercase() {
        let json = serde_json::to_string(&[Modality::Text, Modality::Image]).unwrap();
        assert_eq!(json, r#"["TEXT","IMAGE"]"#);
    }

    #[test]
    fn test_request_from_config() {
        let config = GenerationConfig::new()
            .with_temperature(0.2)
            .with_max_output_tokens(256)
            .with_modalities([Modality::Text]);
        let req = GenerationRequest::new("Hello", &config);

        assert_eq!(req.prompt, "Hello");
        assert_eq!(req.temperature, 0.2);
        assert_eq!(req.max_output_tokens, 256);
        assert_eq!(req.response_modalities, vec![Modality::Text]);
    }

    #[test]
    fn test_request_drops_duplicate_modalities() {
        let mut config = GenerationConfig::new();
        config.modalities = vec![Modality::Image, Modality::Image, Modality::Text];
        let req = GenerationRequest::new("Hello", &config);
        assert_eq!(
            req.response_modalities,
            vec![Modality::Image, Modality::Text]
        );
    }

    #[test]
    fn test_inline_image_decode() {
        let image = InlineImage::new("image/png", "iVBORw0KGgo=");
        assert_eq!(
            image.decode().unwrap(),
            vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]
        );

        let bad = InlineImage::new("image/png", "not base64!");
        assert!(matches!(bad.decode(), Err(ExtractionError::Decode(_))));
    }

    #[test]
    fn test_response_with_image() {
        let resp = GenerateResponse::default().with_image(InlineImage::new("image/png", "AA=="));
        assert!(resp.text.is_none());
        assert_eq!(resp.images.as_ref().map(Vec::len), Some(1));
    }
}
