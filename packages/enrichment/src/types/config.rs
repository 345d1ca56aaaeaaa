//! Configuration for the enrichment pipeline.
//!
//! One `EnrichConfig` is built up front and injected at orchestrator
//! construction; adapters never read credentials or endpoints from the
//! environment themselves, which keeps them testable with fixture configs.

use std::time::Duration;

use crate::security::SecretString;

/// Configuration for the openclaw-style provider (submit, get a URL back).
#[derive(Debug, Clone)]
pub struct RemoteJobConfig {
    /// Service base URL.
    pub endpoint: String,
    /// Bearer credential; calls fail with `NotConfigured` when absent.
    pub api_key: Option<SecretString>,
    pub width: u32,
    pub height: u32,
    pub steps: u32,
    pub timeout: Duration,
}

impl Default for RemoteJobConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8050".to_string(),
            api_key: None,
            width: 1200,
            height: 630,
            steps: 20,
            timeout: Duration::from_secs(120),
        }
    }
}

/// Configuration for the hosted image API (URL inside a result array).
#[derive(Debug, Clone)]
pub struct DirectImageConfig {
    pub base_url: String,
    pub api_key: Option<SecretString>,
    pub model: String,
    /// Size string in the provider's "WxH" convention.
    pub size: String,
    pub timeout: Duration,
}

impl Default for DirectImageConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: "dall-e-3".to_string(),
            size: "1024x1024".to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

/// Configuration for the fire-and-forget job queue (ComfyUI-style).
#[derive(Debug, Clone)]
pub struct AsyncQueueConfig {
    pub endpoint: String,
    pub timeout: Duration,
}

impl Default for AsyncQueueConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8188".to_string(),
            timeout: Duration::from_secs(180),
        }
    }
}

/// Configuration for the local synthesis server (base64 bytes inline).
#[derive(Debug, Clone)]
pub struct LocalSynthConfig {
    pub endpoint: String,
    pub width: u32,
    pub height: u32,
    pub steps: u32,
    pub timeout: Duration,
}

impl Default for LocalSynthConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:7860".to_string(),
            width: 1200,
            height: 630,
            steps: 20,
            timeout: Duration::from_secs(120),
        }
    }
}

/// Top-level configuration injected into the orchestrator.
#[derive(Debug, Clone)]
pub struct EnrichConfig {
    /// How many body characters stand in for a missing excerpt when
    /// building image prompts.
    pub excerpt_len: usize,
    /// How many body characters feed the tag-extraction prompt.
    pub tag_body_len: usize,
    /// Hard cap on extracted tags per item.
    pub max_tags: usize,
    /// Completion budget for the tag-extraction call.
    pub tag_max_tokens: u32,
    /// Bounded timeout for downloading a remote artifact.
    pub fetch_timeout: Duration,
    pub remote_job: RemoteJobConfig,
    pub direct_image: DirectImageConfig,
    pub async_queue: AsyncQueueConfig,
    pub local_synth: LocalSynthConfig,
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            excerpt_len: 250,
            tag_body_len: 500,
            max_tags: 10,
            tag_max_tokens: 256,
            fetch_timeout: Duration::from_secs(60),
            remote_job: RemoteJobConfig::default(),
            direct_image: DirectImageConfig::default(),
            async_queue: AsyncQueueConfig::default(),
            local_synth: LocalSynthConfig::default(),
        }
    }
}

impl EnrichConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the openclaw-style provider credential.
    pub fn with_remote_job_key(mut self, key: impl Into<SecretString>) -> Self {
        self.remote_job.api_key = Some(key.into());
        self
    }

    /// Set the hosted image API credential.
    pub fn with_direct_image_key(mut self, key: impl Into<SecretString>) -> Self {
        self.direct_image.api_key = Some(key.into());
        self
    }

    /// Set the excerpt truncation length for image prompts.
    pub fn with_excerpt_len(mut self, len: usize) -> Self {
        self.excerpt_len = len;
        self
    }
}
