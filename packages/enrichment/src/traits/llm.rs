//! Completion trait for language-model text generation.

use async_trait::async_trait;

use crate::error::Result;

/// A plain-text completion endpoint.
///
/// Treated as a black box: the returned text is not guaranteed to be
/// well-formed JSON or array syntax, so anything structured must go
/// through a tolerant parser (see [`crate::tags`]).
#[async_trait]
pub trait Completion: Send + Sync {
    /// Complete the prompt, bounded by `max_tokens`.
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String>;
}

#[async_trait]
impl<T: Completion + ?Sized> Completion for std::sync::Arc<T> {
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        (**self).complete(prompt, max_tokens).await
    }
}
