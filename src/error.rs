//! Error types for text and image generation.

use std::time::Duration;

/// Errors returned by [`GenerationRequester::generate`](crate::GenerationRequester::generate).
#[derive(Debug, thiserror::Error)]
pub enum GenError {
    /// Required configuration could not be resolved (e.g. no project id).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Invalid request parameters.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The remote model service call failed.
    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// Failures of the remote model call.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Access token missing or rejected.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Sanitized response body.
        message: String,
    },

    /// Quota or rate limit exceeded.
    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited {
        /// Delay suggested by the `Retry-After` header.
        retry_after: Option<Duration>,
    },

    /// Prompt or output was blocked by safety filters.
    #[error("content blocked: {0}")]
    ContentBlocked(String),

    /// Network or HTTP error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reply did not have the expected shape.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

/// Why no image could be taken from a response.
///
/// Never surfaced by `generate`; the requester falls back to text-only output.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    /// The response carried no image collection at all.
    #[error("response has no image collection")]
    Absent,

    /// The image collection was present but empty.
    #[error("response image collection is empty")]
    Empty,

    /// The first image payload could not be decoded.
    #[error("failed to decode image payload: {0}")]
    Decode(String),
}

/// Result type alias for generation operations.
pub type Result<T> = std::result::Result<T, GenError>;

const MAX_ERROR_MESSAGE_LEN: usize = 500;

/// Collapses whitespace and truncates a service error body for display.
pub(crate) fn sanitize_error_message(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= MAX_ERROR_MESSAGE_LEN {
        return collapsed;
    }
    let truncated: String = collapsed.chars().take(MAX_ERROR_MESSAGE_LEN).collect();
    format!("{truncated}...")
}

/// Reads a `Retry-After` header given in whole seconds.
pub(crate) fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderMap, HeaderValue, RETRY_AFTER};

    #[test]
    fn test_error_display() {
        let err = GenError::from(ServiceError::Api {
            status: 404,
            message: "Not found".into(),
        });
        assert_eq!(err.to_string(), "API error: 404 - Not found");

        let err = GenError::Configuration("missing project id".into());
        assert_eq!(err.to_string(), "configuration error: missing project id");

        assert_eq!(
            ExtractionError::Empty.to_string(),
            "response image collection is empty"
        );
    }

    #[test]
    fn test_sanitize_collapses_whitespace() {
        assert_eq!(
            sanitize_error_message("  quota\n   exceeded\tfor project "),
            "quota exceeded for project"
        );
    }

    #[test]
    fn test_sanitize_truncates_long_bodies() {
        let body = "x".repeat(MAX_ERROR_MESSAGE_LEN + 50);
        let msg = sanitize_error_message(&body);
        assert!(msg.ends_with("..."));
        assert_eq!(msg.chars().count(), MAX_ERROR_MESSAGE_LEN + 3);
    }

    #[test]
    fn test_parse_retry_after() {
        let mut headers = HeaderMap::new();
        assert_eq!(parse_retry_after(&headers), None);

        headers.insert(RETRY_AFTER, HeaderValue::from_static("30"));
        assert_eq!(parse_retry_after(&headers), Some(30));

        headers.insert(RETRY_AFTER, HeaderValue::from_static("soon"));
        assert_eq!(parse_retry_after(&headers), None);
    }
}
