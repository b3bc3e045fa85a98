#![warn(missing_docs)]
//! vertexgen - Text and image generation with Gemini on Vertex AI.
//!
//! One call sends a prompt with its generation parameters to a hosted model.
//! The reply text is returned and the first generated image, if any, is saved
//! to disk.
//!
//! # Quick Start
//!
//! ```no_run
//! use vertexgen::{GenerationConfig, GenerationRequester, Modality, VertexTransport};
//!
//! #[tokio::main]
//! async fn main() -> vertexgen::Result<()> {
//!     let requester = GenerationRequester::new(VertexTransport::builder().build());
//!     let config = GenerationConfig::new()
//!         .with_project_id("my-project")
//!         .with_modalities([Modality::Text, Modality::Image]);
//!
//!     let result = requester
//!         .generate("Draw a prism splitting white light", &config)
//!         .await?;
//!     println!("{}", result.text);
//!     Ok(())
//! }
//! ```
//!
//! # Configuration
//!
//! Anything not set on [`GenerationConfig`] is resolved in priority order:
//! - project id: `GOOGLE_CLOUD_PROJECT`, then `DEVSHELL_PROJECT_ID`
//! - location: `GOOGLE_CLOUD_REGION`, then `REGION`, then `us-central1`
//!
//! Use [`GenerationRequester::generate_with`] to inject a different lookup.
//!
//! # Features
//!
//! - `cli`: the `vertexgen` command-line binary (default)

pub mod config;
mod error;
pub mod requester;
pub mod transport;
pub mod types;
pub mod vertex;

// Re-export error types at crate root
pub use error::{ExtractionError, GenError, Result, ServiceError};

pub use config::{GenerationConfig, ModelTarget};
pub use requester::{extract_first_image, GenerationRequester};
pub use transport::ModelTransport;
pub use types::{GenerateResponse, GeneratedResult, GenerationRequest, InlineImage, Modality};
pub use vertex::{TokenSource, VertexTransport, VertexTransportBuilder};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::config::GenerationConfig;
    pub use crate::error::{GenError, Result};
    pub use crate::requester::GenerationRequester;
    pub use crate::transport::ModelTransport;
    pub use crate::types::{GeneratedResult, Modality};
    pub use crate::vertex::VertexTransport;
}
