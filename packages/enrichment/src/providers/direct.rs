//! Hosted image-API adapter (OpenAI-compatible images endpoint).
//!
//! Sends model and size parameters and expects the image URL nested in a
//! `data` result array. "No credential" and "provider returned no data"
//! are deliberately distinct failures: the first is a local configuration
//! problem, the second a protocol one.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{EnrichError, Result};
use crate::traits::provider::ImageProvider;
use crate::types::config::DirectImageConfig;
use crate::types::generation::{GenerationResult, ImagePayload};

pub const NAME: &str = "openai";

pub struct DirectImageProvider {
    client: Client,
    config: DirectImageConfig,
}

#[derive(Serialize)]
struct ImagesRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u32,
    size: &'a str,
}

#[derive(Deserialize)]
struct ImagesResponse {
    #[serde(default)]
    data: Vec<ImageDatum>,
}

#[derive(Deserialize)]
struct ImageDatum {
    url: Option<String>,
}

impl DirectImageProvider {
    pub fn new(config: DirectImageConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl ImageProvider for DirectImageProvider {
    fn name(&self) -> &str {
        NAME
    }

    async fn generate(&self, prompt: &str, item_id: u64) -> Result<GenerationResult> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or_else(|| EnrichError::NotConfigured {
                provider: NAME.to_string(),
            })?;

        tracing::debug!(
            item_id,
            provider = NAME,
            model = %self.config.model,
            "requesting image"
        );

        let response = self
            .client
            .post(format!("{}/images/generations", self.config.base_url))
            .bearer_auth(api_key.expose())
            .timeout(self.config.timeout)
            .json(&ImagesRequest {
                model: &self.config.model,
                prompt,
                n: 1,
                size: &self.config.size,
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

        let body: ImagesResponse = response
            .json()
            .await
            .map_err(|e| EnrichError::ProviderProtocol {
                provider: NAME.to_string(),
                message: format!("invalid response body: {e}"),
            })?;

        let url = body
            .data
            .into_iter()
            .find_map(|d| d.url)
            .ok_or_else(|| EnrichError::ProviderProtocol {
                provider: NAME.to_string(),
                message: "provider returned no data".to_string(),
            })?;

        Ok(GenerationResult::Completed(ImagePayload::Remote(url)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_credential_is_not_configured() {
        let provider = DirectImageProvider::new(DirectImageConfig::default());
        let err = provider.generate("newsroom scene", 42).await.unwrap_err();
        assert!(
            matches!(err, EnrichError::NotConfigured { ref provider } if provider.as_str() == NAME)
        );
    }
}
