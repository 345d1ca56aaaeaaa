//! Testing utilities including mock implementations.
//!
//! Useful for testing applications that use the enrichment library
//! without real providers or a real completion endpoint.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::{EnrichError, Result};
use crate::traits::llm::Completion;
use crate::traits::provider::ImageProvider;
use crate::types::generation::{GenerationResult, ImagePayload};

/// Scripted response for a [`MockProvider`] call.
#[derive(Debug, Clone)]
pub enum MockResponse {
    Completed(ImagePayload),
    Pending(String),
    NotConfigured,
    Unreachable,
    Protocol(String),
    Timeout,
}

impl MockResponse {
    /// Convenience: a completed inline PNG payload.
    pub fn inline(bytes: impl Into<Vec<u8>>) -> Self {
        MockResponse::Completed(ImagePayload::Inline {
            bytes: bytes.into(),
            content_type: "image/png".to_string(),
        })
    }

    /// Convenience: a completed remote-URL payload.
    pub fn remote(url: impl Into<String>) -> Self {
        MockResponse::Completed(ImagePayload::Remote(url.into()))
    }

    fn into_result(self, provider: &str) -> Result<GenerationResult> {
        match self {
            MockResponse::Completed(payload) => Ok(GenerationResult::Completed(payload)),
            MockResponse::Pending(job_id) => Ok(GenerationResult::Pending {
                provider: provider.to_string(),
                job_id,
            }),
            MockResponse::NotConfigured => Err(EnrichError::NotConfigured {
                provider: provider.to_string(),
            }),
            MockResponse::Unreachable => Err(EnrichError::Unreachable {
                provider: provider.to_string(),
                message: "connection refused".to_string(),
            }),
            MockResponse::Protocol(message) => Err(EnrichError::ProviderProtocol {
                provider: provider.to_string(),
                message,
            }),
            MockResponse::Timeout => Err(EnrichError::Timeout {
                provider: provider.to_string(),
            }),
        }
    }
}

/// A mock image provider with scripted, per-item responses.
///
/// Records every call (item id and prompt) for assertions.
pub struct MockProvider {
    name: String,
    responses: RwLock<HashMap<u64, MockResponse>>,
    default: RwLock<Option<MockResponse>>,
    calls: RwLock<Vec<(u64, String)>>,
}

impl MockProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            responses: RwLock::new(HashMap::new()),
            default: RwLock::new(None),
            calls: RwLock::new(Vec::new()),
        }
    }

    /// Script the response for a specific item id.
    pub fn with_response(self, item_id: u64, response: MockResponse) -> Self {
        self.responses.write().unwrap().insert(item_id, response);
        self
    }

    /// Script the fallback response for items without a specific one.
    pub fn with_default(self, response: MockResponse) -> Self {
        *self.default.write().unwrap() = Some(response);
        self
    }

    /// All recorded calls as (item id, prompt) pairs.
    pub fn calls(&self) -> Vec<(u64, String)> {
        self.calls.read().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }
}

#[async_trait]
impl ImageProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, prompt: &str, item_id: u64) -> Result<GenerationResult> {
        self.calls
            .write()
            .unwrap()
            .push((item_id, prompt.to_string()));
        let response = self
            .responses
            .read()
            .unwrap()
            .get(&item_id)
            .cloned()
            .or_else(|| self.default.read().unwrap().clone())
            .unwrap_or_else(|| MockResponse::inline(vec![0u8; 4]));
        response.into_result(&self.name)
    }
}

/// A mock completion endpoint returning a fixed text.
pub struct MockCompletion {
    output: RwLock<String>,
    calls: RwLock<Vec<String>>,
    fail: RwLock<bool>,
}

impl MockCompletion {
    pub fn new(output: impl Into<String>) -> Self {
        Self {
            output: RwLock::new(output.into()),
            calls: RwLock::new(Vec::new()),
            fail: RwLock::new(false),
        }
    }

    /// Change the canned output.
    pub fn set_output(&self, output: impl Into<String>) {
        *self.output.write().unwrap() = output.into();
    }

    /// Make subsequent calls fail as unreachable.
    pub fn set_failure(&self, fail: bool) {
        *self.fail.write().unwrap() = fail;
    }

    /// All prompts received so far.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl Completion for MockCompletion {
    async fn complete(&self, prompt: &str, _max_tokens: u32) -> Result<String> {
        self.calls.write().unwrap().push(prompt.to_string());
        if *self.fail.read().unwrap() {
            return Err(EnrichError::Unreachable {
                provider: "llm".to_string(),
                message: "mock failure".to_string(),
            });
        }
        Ok(self.output.read().unwrap().clone())
    }
}
