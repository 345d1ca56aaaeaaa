//! ComfyUI adapter: fire-and-forget job submission.
//!
//! ComfyUI queues a workflow and renders it later; the submit call does
//! not wait for completion. A well-formed submit therefore always yields
//! `Pending` with the queued job id, which a collaborator can poll or
//! discard. Only transport-level failures surface as errors.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{EnrichError, Result};
use crate::traits::provider::ImageProvider;
use crate::types::config::AsyncQueueConfig;
use crate::types::generation::GenerationResult;

pub const NAME: &str = "comfyui";

pub struct ComfyUiProvider {
    client: Client,
    config: AsyncQueueConfig,
}

#[derive(Serialize)]
struct QueueRequest<'a> {
    prompt: WorkflowInputs<'a>,
}

#[derive(Serialize)]
struct WorkflowInputs<'a> {
    inputs: TextInput<'a>,
}

#[derive(Serialize)]
struct TextInput<'a> {
    text: &'a str,
    /// Carried through the workflow so the finished render can be routed
    /// back to the right content item.
    item_id: u64,
}

#[derive(Deserialize)]
struct QueueResponse {
    prompt_id: Option<String>,
}

impl ComfyUiProvider {
    pub fn new(config: AsyncQueueConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl ImageProvider for ComfyUiProvider {
    fn name(&self) -> &str {
        NAME
    }

    async fn generate(&self, prompt: &str, item_id: u64) -> Result<GenerationResult> {
        tracing::debug!(item_id, provider = NAME, "queueing generation job");

        let response = self
            .client
            .post(format!("{}/prompt", self.config.endpoint))
            .timeout(self.config.timeout)
            .json(&QueueRequest {
                prompt: WorkflowInputs {
                    inputs: TextInput {
                        text: prompt,
                        item_id,
                    },
                },
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

        let body: QueueResponse = response
            .json()
            .await
            .map_err(|e| EnrichError::ProviderProtocol {
                provider: NAME.to_string(),
                message: format!("invalid response body: {e}"),
            })?;

        let job_id = body
            .prompt_id
            .ok_or_else(|| EnrichError::ProviderProtocol {
                provider: NAME.to_string(),
                message: "response missing prompt_id".to_string(),
            })?;

        tracing::info!(item_id, provider = NAME, job_id = %job_id, "job queued");

        Ok(GenerationResult::Pending {
            provider: NAME.to_string(),
            job_id,
        })
    }
}
