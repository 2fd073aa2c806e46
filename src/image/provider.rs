//! Image provider trait.

use crate::error::Result;
use crate::image::types::{GenerationRequest, GenerationResult, ProviderKind};
use async_trait::async_trait;

/// Trait for image generation providers.
///
/// Implementations report every failure as
/// [`ImageGenError::ProviderGeneration`](crate::ImageGenError::ProviderGeneration)
/// tagged with their own kind, so callers can fall back to another provider.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Generates an image from the given request.
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult>;

    /// Returns the kind of this provider.
    fn kind(&self) -> ProviderKind;

    /// Returns the name of this provider for display.
    fn name(&self) -> &str {
        self.kind().display_name()
    }
}
