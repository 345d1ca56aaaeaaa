//! Provider trait for image generation backends.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::generation::GenerationResult;

/// An external service capable of producing an image from a text prompt.
///
/// Implementations absorb their backend's idiosyncrasies (synchronous
/// bytes, remote URLs, queued jobs) and normalize everything into
/// [`GenerationResult`]. Typed failures come back as `Err`, never panics:
/// a missing credential must be reported as `NotConfigured` before any
/// network I/O happens.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Registry name of this provider.
    fn name(&self) -> &str;

    /// Generate an image for the prompt.
    ///
    /// `item_id` identifies the content item the image is for; providers
    /// that queue jobs include it in the job description so a collaborator
    /// can route the finished image back.
    async fn generate(&self, prompt: &str, item_id: u64) -> Result<GenerationResult>;
}
