//! Provider adapters and the name→adapter dispatch table.
//!
//! Four backends with incompatible semantics sit behind the one
//! [`ImageProvider`] trait:
//!
//! - [`openclaw`] — submit-and-get-URL synchronously
//! - [`direct`] — hosted API, URL inside a result array
//! - [`comfy`] — fire-and-forget job queue, always pending
//! - [`a1111`] — local synthesis, base64 bytes inline

pub mod a1111;
pub mod comfy;
pub mod direct;
pub mod openclaw;

use std::collections::HashMap;
use std::sync::Arc;

use crate::traits::provider::ImageProvider;
use crate::types::config::EnrichConfig;

pub use a1111::A1111Provider;
pub use comfy::ComfyUiProvider;
pub use direct::DirectImageProvider;
pub use openclaw::OpenClawProvider;

/// Dispatch table from provider name to adapter, fixed at construction.
///
/// Adapters with a missing credential are still registered; they reject
/// calls with `NotConfigured` rather than disappearing from the table,
/// so "typo in the name" and "key not set" stay distinguishable.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn ImageProvider>>,
}

impl ProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the standard registry from configuration.
    pub fn from_config(config: &EnrichConfig) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(OpenClawProvider::new(config.remote_job.clone())));
        registry.register(Arc::new(DirectImageProvider::new(
            config.direct_image.clone(),
        )));
        registry.register(Arc::new(ComfyUiProvider::new(config.async_queue.clone())));
        registry.register(Arc::new(A1111Provider::new(config.local_synth.clone())));
        registry
    }

    /// Register an adapter under its own name.
    pub fn register(&mut self, provider: Arc<dyn ImageProvider>) {
        self.providers
            .insert(provider.name().to_string(), provider);
    }

    /// Look up an adapter by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn ImageProvider>> {
        self.providers.get(name).cloned()
    }

    /// Registered provider names.
    pub fn names(&self) -> Vec<&str> {
        self.providers.keys().map(String::as_str).collect()
    }
}
