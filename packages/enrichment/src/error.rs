//! Typed errors for the enrichment library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) so callers can branch
//! on the exact failure kind: a missing credential, a provider speaking an
//! unexpected shape, and a dead network are all handled differently upstream.

use thiserror::Error;

/// Errors that can occur during enrichment operations.
#[derive(Debug, Error)]
pub enum EnrichError {
    /// Content item does not exist in the store
    #[error("content item not found: {item_id}")]
    NotFound { item_id: u64 },

    /// Provider name does not match any registered adapter
    #[error("unknown provider: {0}")]
    UnknownProvider(String),

    /// Provider credential is missing; checked before any network call
    #[error("provider not configured: {provider}")]
    NotConfigured { provider: String },

    /// Transport-level failure reaching a provider
    #[error("provider unreachable: {provider}: {message}")]
    Unreachable { provider: String, message: String },

    /// Provider responded, but the payload was missing the expected shape
    #[error("provider protocol error: {provider}: {message}")]
    ProviderProtocol { provider: String, message: String },

    /// Provider call exceeded its bounded timeout
    #[error("provider timed out: {provider}")]
    Timeout { provider: String },

    /// Artifact download or storage failed
    #[error("artifact fetch failed: {message}")]
    Fetch { message: String },

    /// Tag extraction found no usable structure in the model output
    #[error("no parseable tag list in model output")]
    Unparseable,

    /// Content store operation failed
    #[error("content store error: {0}")]
    Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl EnrichError {
    /// Classify a reqwest failure against a named provider.
    ///
    /// Timeouts are surfaced as their own kind; everything else at the
    /// transport level is `Unreachable`.
    pub fn from_transport(provider: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            EnrichError::Timeout {
                provider: provider.to_string(),
            }
        } else {
            EnrichError::Unreachable {
                provider: provider.to_string(),
                message: err.to_string(),
            }
        }
    }

    /// Stable label for the failure kind, for logs and caller-facing
    /// outcome records.
    pub fn kind(&self) -> &'static str {
        match self {
            EnrichError::NotFound { .. } => "not_found",
            EnrichError::UnknownProvider(_) => "unknown_provider",
            EnrichError::NotConfigured { .. } => "not_configured",
            EnrichError::Unreachable { .. } => "unreachable",
            EnrichError::ProviderProtocol { .. } => "provider_protocol",
            EnrichError::Timeout { .. } => "timeout",
            EnrichError::Fetch { .. } => "fetch",
            EnrichError::Unparseable => "unparseable",
            EnrichError::Store(_) => "store",
        }
    }
}

/// Result type alias for enrichment operations.
pub type Result<T> = std::result::Result<T, EnrichError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_labels_are_stable() {
        assert_eq!(EnrichError::NotFound { item_id: 7 }.kind(), "not_found");
        assert_eq!(
            EnrichError::UnknownProvider("nope".into()).kind(),
            "unknown_provider"
        );
        assert_eq!(EnrichError::Unparseable.kind(), "unparseable");
    }
}
