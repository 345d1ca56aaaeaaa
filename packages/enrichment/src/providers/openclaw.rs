//! OpenClaw adapter: submit a prompt, get an image URL back synchronously.
//!
//! OpenClaw is a containerized generation service with a single
//! `POST /generate` endpoint guarded by a bearer token. It renders
//! synchronously and responds with a URL to the finished image, so the
//! fetcher still has to download it.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{EnrichError, Result};
use crate::traits::provider::ImageProvider;
use crate::types::config::RemoteJobConfig;
use crate::types::generation::{GenerationResult, ImagePayload};

pub const NAME: &str = "openclaw";

pub struct OpenClawProvider {
    client: Client,
    config: RemoteJobConfig,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    prompt: &'a str,
    width: u32,
    height: u32,
    num_inference_steps: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    image_url: Option<String>,
}

impl OpenClawProvider {
    pub fn new(config: RemoteJobConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl ImageProvider for OpenClawProvider {
    fn name(&self) -> &str {
        NAME
    }

    async fn generate(&self, prompt: &str, item_id: u64) -> Result<GenerationResult> {
        // Credential check happens before any network I/O.
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or_else(|| EnrichError::NotConfigured {
                provider: NAME.to_string(),
            })?;

        tracing::debug!(item_id, provider = NAME, "submitting generation request");

        let response = self
            .client
            .post(format!("{}/generate", self.config.endpoint))
            .bearer_auth(api_key.expose())
            .timeout(self.config.timeout)
            .json(&GenerateRequest {
                prompt,
                width: self.config.width,
                height: self.config.height,
                num_inference_steps: self.config.steps,
            })
            .send()
            .await
            .map_err(|e| EnrichError::from_transport(NAME, e))?;

        if !response.status().is_success() {
            return Err(EnrichError::ProviderProtocol {
                provider: NAME.to_string(),
                message: format!("unexpected status {}", response.status()),
            });
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| EnrichError::ProviderProtocol {
                provider: NAME.to_string(),
                message: format!("invalid response body: {e}"),
            })?;

        let url = body.image_url.ok_or_else(|| EnrichError::ProviderProtocol {
            provider: NAME.to_string(),
            message: "response missing image_url".to_string(),
        })?;

        Ok(GenerationResult::Completed(ImagePayload::Remote(url)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_credential_is_not_configured() {
        // No api_key in the config: the adapter must refuse before any
        // network call (the default endpoint points at localhost and
        // nothing is listening, so reaching the network would error
        // differently).
        let provider = OpenClawProvider::new(RemoteJobConfig::default());
        let err = provider.generate("a drone at sunset", 1).await.unwrap_err();
        assert!(
            matches!(err, EnrichError::NotConfigured { ref provider } if provider.as_str() == NAME)
        );
    }
}
