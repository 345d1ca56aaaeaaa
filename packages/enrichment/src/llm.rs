//! OpenAI-compatible chat-completion client.
//!
//! Covers both a local llama.cpp proxy (no credential) and hosted
//! endpoints (bearer key) behind the [`Completion`] trait. The response
//! is returned as plain text; callers own any structured parsing.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{EnrichError, Result};
use crate::security::SecretString;
use crate::traits::llm::Completion;

const NAME: &str = "llm";

/// Chat-completions client for any OpenAI-compatible server.
pub struct OpenAiCompat {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<SecretString>,
    system: String,
    timeout: Duration,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

impl OpenAiCompat {
    /// Create a client against the given base URL (e.g. a local llama.cpp
    /// proxy at `http://172.17.0.1:1240` or `https://api.openai.com` with
    /// a key). The `/v1/chat/completions` path is appended per request.
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            model: model.into(),
            api_key: None,
            system: "You are a professional news editor.".to_string(),
            timeout: Duration::from_secs(120),
        }
    }

    /// Set the bearer credential (hosted endpoints).
    pub fn with_api_key(mut self, key: impl Into<SecretString>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Override the system prompt.
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = system.into();
        self
    }

    /// Override the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl Completion for OpenAiCompat {
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &self.system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: 0.7,
            max_tokens,
        };

        let mut builder = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .timeout(self.timeout)
            .json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key.expose());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| EnrichError::from_transport(NAME, e))?;

        if !response.status().is_success() {
            return Err(EnrichError::ProviderProtocol {
                provider: NAME.to_string(),
                message: format!("unexpected status {}", response.status()),
            });
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| EnrichError::ProviderProtocol {
                provider: NAME.to_string(),
                message: format!("invalid response body: {e}"),
            })?;

        body.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| EnrichError::ProviderProtocol {
                provider: NAME.to_string(),
                message: "response contained no choices".to_string(),
            })
    }
}
