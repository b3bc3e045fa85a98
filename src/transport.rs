//! Transport trait for the remote model service.

use crate::config::ModelTarget;
use crate::error::ServiceError;
use crate::types::{GenerateResponse, GenerationRequest};
use async_trait::async_trait;

/// A client able to send one generation request to a model service.
#[async_trait]
pub trait ModelTransport: Send + Sync {
    /// Sends `request` to the model addressed by `target`.
    async fn generate_content(
        &self,
        target: &ModelTarget,
        request: &GenerationRequest,
    ) -> Result<GenerateResponse, ServiceError>;

    /// Returns the name of this transport for display.
    fn name(&self) -> &str;
}

#[async_trait]
impl<T: ModelTransport + ?Sized> ModelTransport for &T {
    async fn generate_content(
        &self,
        target: &ModelTarget,
        request: &GenerationRequest,
    ) -> Result<GenerateResponse, ServiceError> {
        (**self).generate_content(target, request).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
