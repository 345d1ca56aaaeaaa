//! Automatic1111 adapter: local synthesis with inline base64 bytes.
//!
//! The txt2img endpoint renders synchronously and returns the image
//! base64-encoded inside the response body, so there is no separate
//! download step; the decoded bytes go straight to the media store.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{EnrichError, Result};
use crate::traits::provider::ImageProvider;
use crate::types::config::LocalSynthConfig;
use crate::types::generation::{GenerationResult, ImagePayload};

pub const NAME: &str = "a1111";

pub struct A1111Provider {
    client: Client,
    config: LocalSynthConfig,
}

#[derive(Serialize)]
struct Txt2ImgRequest<'a> {
    prompt: &'a str,
    steps: u32,
    width: u32,
    height: u32,
}

#[derive(Deserialize)]
struct Txt2ImgResponse {
    #[serde(default)]
    images: Vec<String>,
}

impl A1111Provider {
    pub fn new(config: LocalSynthConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl ImageProvider for A1111Provider {
    fn name(&self) -> &str {
        NAME
    }

    async fn generate(&self, prompt: &str, item_id: u64) -> Result<GenerationResult> {
        tracing::debug!(item_id, provider = NAME, "rendering locally");

        let response = self
            .client
            .post(format!("{}/sdapi/v1/txt2img", self.config.endpoint))
            .timeout(self.config.timeout)
            .json(&Txt2ImgRequest {
                prompt,
                steps: self.config.steps,
                width: self.config.width,
                height: self.config.height,
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

        let body: Txt2ImgResponse = response
            .json()
            .await
            .map_err(|e| EnrichError::ProviderProtocol {
                provider: NAME.to_string(),
                message: format!("invalid response body: {e}"),
            })?;

        let encoded = body
            .images
            .into_iter()
            .next()
            .ok_or_else(|| EnrichError::ProviderProtocol {
                provider: NAME.to_string(),
                message: "response contained no images".to_string(),
            })?;

        let bytes = STANDARD
            .decode(encoded.as_bytes())
            .map_err(|e| EnrichError::ProviderProtocol {
                provider: NAME.to_string(),
                message: format!("invalid base64 image data: {e}"),
            })?;

        Ok(GenerationResult::Completed(ImagePayload::Inline {
            bytes,
            content_type: "image/png".to_string(),
        }))
    }
}
