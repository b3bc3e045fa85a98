//! The generate-and-persist flow.

use crate::config::{GenerationConfig, ModelTarget};
use crate::error::{ExtractionError, GenError, Result};
use crate::transport::ModelTransport;
use crate::types::{GenerateResponse, GeneratedResult, GenerationRequest};
use std::path::{Path, PathBuf};

/// Sends prompts through a [`ModelTransport`] and saves the first returned image.
pub struct GenerationRequester<T> {
    transport: T,
}

impl<T: ModelTransport> GenerationRequester<T> {
    /// Wraps a transport owned by the caller.
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Returns the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Generates a response, resolving missing config from the process environment.
    pub async fn generate(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<GeneratedResult> {
        let target = config.resolve_target()?;
        self.generate_for(prompt, config, &target).await
    }

    /// Like [`generate`](Self::generate), but resolves missing config through `lookup`.
    pub async fn generate_with<F>(
        &self,
        prompt: &str,
        config: &GenerationConfig,
        lookup: F,
    ) -> Result<GeneratedResult>
    where
        F: Fn(&str) -> Option<String>,
    {
        let target = config.resolve_target_with(lookup)?;
        self.generate_for(prompt, config, &target).await
    }

    /// Sends `prompt` to an already-resolved target.
    ///
    /// A single attempt; service failures are returned as [`GenError::Service`].
    pub async fn generate_for(
        &self,
        prompt: &str,
        config: &GenerationConfig,
        target: &ModelTarget,
    ) -> Result<GeneratedResult> {
        if prompt.trim().is_empty() {
            return Err(GenError::InvalidRequest("prompt must not be empty".into()));
        }
        if config.modalities.is_empty() {
            return Err(GenError::InvalidRequest(
                "at least one response modality is required".into(),
            ));
        }

        let request = GenerationRequest::new(prompt, config);
        tracing::debug!(
            transport = self.transport.name(),
            model = %target.model,
            modalities = ?request.response_modalities,
            "generating content"
        );
        let response = self.transport.generate_content(target, &request).await?;

        Ok(assemble_result(&response, &config.output_path))
    }
}

/// Returns the decoded bytes of the first image in `response`.
pub fn extract_first_image(
    response: &GenerateResponse,
) -> std::result::Result<Vec<u8>, ExtractionError> {
    let images = response.images.as_ref().ok_or(ExtractionError::Absent)?;
    let first = images.first().ok_or(ExtractionError::Empty)?;
    first.decode()
}

/// Formats the marker appended to the text when an image was saved.
pub fn image_saved_marker(path: &Path) -> String {
    format!("[Image saved to: {}]", path.display())
}

fn assemble_result(response: &GenerateResponse, output_path: &Path) -> GeneratedResult {
    let text = response.text.as_deref().unwrap_or_default().trim();

    let image_path = match extract_first_image(response) {
        Ok(bytes) => persist_image(&bytes, output_path),
        Err(ExtractionError::Absent | ExtractionError::Empty) => None,
        Err(e) => {
            tracing::warn!("skipping image output: {e}");
            None
        }
    };

    match image_path {
        Some(path) => GeneratedResult {
            text: format!("{text}\n{}", image_saved_marker(&path))
                .trim()
                .to_string(),
            image_path: Some(path),
        },
        None => GeneratedResult {
            text: text.to_string(),
            image_path: None,
        },
    }
}

fn persist_image(bytes: &[u8], path: &Path) -> Option<PathBuf> {
    match std::fs::write(path, bytes) {
        Ok(()) => {
            tracing::debug!(path = %path.display(), size_bytes = bytes.len(), "saved generated image");
            Some(path.to_path_buf())
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), "failed to save generated image: {e}");
            None
        }
    }
}
