//! Gemini on Vertex AI transport.

use crate::config::ModelTarget;
use crate::error::{parse_retry_after, sanitize_error_message, ServiceError};
use crate::transport::ModelTransport;
use crate::types::{GenerateResponse, GenerationRequest, InlineImage};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Env var holding a pre-fetched OAuth access token.
pub const ACCESS_TOKEN_VAR: &str = "GOOGLE_ACCESS_TOKEN";

/// How the transport obtains a bearer token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TokenSource {
    /// A fixed token supplied by the caller.
    Static(String),
    /// Run `gcloud auth print-access-token` on every call.
    #[default]
    Gcloud,
}

/// Builder for VertexTransport.
#[derive(Debug, Clone, Default)]
pub struct VertexTransportBuilder {
    access_token: Option<String>,
    base_url: Option<String>,
}

impl VertexTransportBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the access token. Falls back to `GOOGLE_ACCESS_TOKEN`, then gcloud.
    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Overrides the endpoint root (default `https://{location}-aiplatform.googleapis.com`).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Builds the transport. No network or gcloud activity happens here.
    pub fn build(self) -> VertexTransport {
        let token_source = self
            .access_token
            .or_else(|| std::env::var(ACCESS_TOKEN_VAR).ok())
            .filter(|t| !t.trim().is_empty())
            .map(TokenSource::Static)
            .unwrap_or_default();

        VertexTransport {
            client: reqwest::Client::new(),
            token_source,
            base_url: self.base_url.map(|u| u.trim_end_matches('/').to_string()),
        }
    }
}

/// Vertex AI `generateContent` client.
pub struct VertexTransport {
    client: reqwest::Client,
    token_source: TokenSource,
    base_url: Option<String>,
}

/// Get a bearer token by running `gcloud auth print-access-token`.
fn gcloud_access_token() -> Result<String, ServiceError> {
    let output = std::process::Command::new("gcloud")
        .args(["auth", "print-access-token"])
        .output()
        .map_err(|e| {
            ServiceError::Auth(format!(
                "failed to run gcloud CLI: {e}. Set {ACCESS_TOKEN_VAR} or install the Cloud SDK"
            ))
        })?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ServiceError::Auth(format!(
            "gcloud auth failed: {}",
            stderr.trim()
        )));
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

impl VertexTransport {
    /// Creates a new `VertexTransportBuilder`.
    pub fn builder() -> VertexTransportBuilder {
        VertexTransportBuilder::new()
    }

    /// Returns how this transport authenticates.
    pub fn token_source(&self) -> &TokenSource {
        &self.token_source
    }

    /// Returns the `generateContent` URL for `target`.
    pub fn endpoint(&self, target: &ModelTarget) -> String {
        let ModelTarget {
            project_id,
            location,
            model,
        } = target;
        let root = match &self.base_url {
            Some(url) => url.clone(),
            None => format!("https://{location}-aiplatform.googleapis.com"),
        };
        format!(
            "{root}/v1/projects/{project_id}/locations/{location}/publishers/google/models/{model}:generateContent"
        )
    }

    fn bearer_token(&self) -> Result<String, ServiceError> {
        match &self.token_source {
            TokenSource::Static(token) => Ok(token.clone()),
            TokenSource::Gcloud => gcloud_access_token(),
        }
    }

    fn parse_error(
        &self,
        status: u16,
        text: &str,
        headers: &reqwest::header::HeaderMap,
    ) -> ServiceError {
        let text = sanitize_error_message(text);
        match status {
            401 | 403 => ServiceError::Auth(text),
            404 => ServiceError::Api {
                status,
                message: format!("model or project not found: {text}"),
            },
            429 => {
                let retry_after = parse_retry_after(headers).map(std::time::Duration::from_secs);
                ServiceError::RateLimited { retry_after }
            }
            _ => ServiceError::Api {
                status,
                message: text,
            },
        }
    }
}

#[async_trait]
impl ModelTransport for VertexTransport {
    async fn generate_content(
        &self,
        target: &ModelTarget,
        request: &GenerationRequest,
    ) -> Result<GenerateResponse, ServiceError> {
        let start = Instant::now();
        let url = self.endpoint(target);
        let body = VertexRequest::from_generation_request(request);
        let token = self.bearer_token()?;

        tracing::debug!(
            project = %target.project_id,
            location = %target.location,
            model = %target.model,
            "submitting generateContent request"
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let text = response.text().await.unwrap_or_default();
            return Err(self.parse_error(status.as_u16(), &text, &headers));
        }

        let bytes = response.bytes().await?;
        let vertex_response: VertexResponse = serde_json::from_slice(&bytes)?;
        let result = vertex_response.into_generate_response()?;

        tracing::debug!(
            duration_ms = start.elapsed().as_millis() as u64,
            images = result.images.as_ref().map_or(0, Vec::len),
            "generateContent complete"
        );
        Ok(result)
    }

    fn name(&self) -> &str {
        "Gemini (Vertex AI)"
    }
}

// Request/Response types
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VertexRequest {
    contents: Vec<VertexContent>,
    generation_config: VertexGenerationConfig,
}

#[derive(Debug, Serialize)]
struct VertexContent {
    role: &'static str,
    parts: Vec<VertexTextPart>,
}

#[derive(Debug, Serialize)]
struct VertexTextPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VertexGenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
    response_modalities: Vec<&'static str>,
}

impl VertexRequest {
    fn from_generation_request(req: &GenerationRequest) -> Self {
        Self {
            contents: vec![VertexContent {
                role: "user",
                parts: vec![VertexTextPart {
                    text: req.prompt.clone(),
                }],
            }],
            generation_config: VertexGenerationConfig {
                temperature: req.temperature,
                max_output_tokens: req.max_output_tokens,
                response_modalities: req.response_modalities.iter().map(|m| m.as_str()).collect(),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VertexResponse {
    #[serde(default)]
    candidates: Vec<VertexCandidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VertexCandidate {
    #[serde(default)]
    content: Option<VertexContentResponse>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
    #[serde(default)]
    block_reason_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VertexContentResponse {
    #[serde(default)]
    parts: Vec<VertexPartResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VertexPartResponse {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    inline_data: Option<InlineData>,
    #[serde(default)]
    thought: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

const BLOCKING_FINISH_REASONS: &[&str] = &[
    "SAFETY",
    "IMAGE_SAFETY",
    "IMAGE_PROHIBITED_CONTENT",
    "PROHIBITED_CONTENT",
    "BLOCKLIST",
    "SPII",
];

impl VertexResponse {
    fn into_generate_response(self) -> Result<GenerateResponse, ServiceError> {
        // Prompt blocks come back as HTTP 200
        if let Some(ref feedback) = self.prompt_feedback {
            if let Some(ref reason) = feedback.block_reason {
                let msg = feedback
                    .block_reason_message
                    .clone()
                    .unwrap_or_else(|| format!("prompt blocked: {reason}"));
                return Err(ServiceError::ContentBlocked(msg));
            }
        }

        let Some(candidate) = self.candidates.into_iter().next() else {
            return Err(ServiceError::UnexpectedResponse(
                "no candidates in response".into(),
            ));
        };

        let content = match candidate.content {
            Some(content) => content,
            None => {
                if let Some(reason) = candidate.finish_reason.as_deref() {
                    if BLOCKING_FINISH_REASONS.contains(&reason) {
                        return Err(ServiceError::ContentBlocked(format!(
                            "output blocked by safety filter: {reason}"
                        )));
                    }
                }
                return Ok(GenerateResponse::default());
            }
        };

        let mut text: Option<String> = None;
        let mut images = Vec::new();
        for part in content.parts {
            if part.thought == Some(true) {
                continue;
            }
            if let Some(t) = part.text {
                text.get_or_insert_with(String::new).push_str(&t);
            }
            if let Some(inline) = part.inline_data {
                if inline.mime_type.starts_with("image/") {
                    images.push(InlineImage::new(inline.mime_type, inline.data));
                }
            }
        }

        Ok(GenerateResponse {
            text,
            images: Some(images),
        })
    }
}
