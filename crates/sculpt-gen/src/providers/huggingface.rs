//! HuggingFace text-to-image provider
//!
//! Calls the hosted inference API for FLUX.1-dev. The response body is the
//! raw image, so one POST is the whole exchange. Retries belong to the
//! generation loop, not to this client.

use super::{build_agent, describe_transport_error, read_success_body};
use crate::config::SculptConfig;
use crate::prompt::EnhancedPrompt;
use crate::provider::*;
use sculpt_core::{Result, SculptError};
use std::time::Duration;

const DEFAULT_HUGGINGFACE_URL: &str =
    "https://api-inference.huggingface.co/models/black-forest-labs/FLUX.1-dev";

/// HuggingFace Inference API client
pub struct HuggingFaceGenerator {
    api_key: String,
    api_url: String,
    agent: ureq::Agent,
}

impl HuggingFaceGenerator {
    /// Create a new HuggingFaceGenerator from config
    pub fn from_config(config: &SculptConfig) -> Result<Self> {
        let api_key = config
            .api_key("huggingface")
            .ok_or_else(|| {
                SculptError::ConfigError(
                    "HuggingFace API key not configured. Set SCULPT_HUGGINGFACE_API_KEY or add to .sculpt/config.toml".to_string(),
                )
            })?
            .to_string();

        let api_url = config
            .api_url("huggingface")
            .unwrap_or(DEFAULT_HUGGINGFACE_URL)
            .to_string();

        Ok(Self::new(
            api_key,
            api_url,
            config.generation.request_timeout(),
        ))
    }

    pub fn new(api_key: String, api_url: String, timeout: Duration) -> Self {
        Self {
            api_key,
            api_url,
            agent: build_agent(timeout),
        }
    }
}

/// JSON body for the inference endpoint
pub fn build_payload(prompt: &EnhancedPrompt) -> serde_json::Value {
    let mut payload = serde_json::json!({ "inputs": prompt.prompt });
    if !prompt.negative_prompt.is_empty() {
        payload["parameters"] = serde_json::json!({
            "negative_prompt": prompt.negative_prompt
        });
    }
    payload
}

impl ImageGenerator for HuggingFaceGenerator {
    fn name(&self) -> &str {
        "huggingface"
    }

    fn health_check(&self) -> Result<ProviderStatus> {
        if self.api_key.is_empty() {
            return Ok(ProviderStatus::NoApiKey);
        }
        Ok(ProviderStatus::Available)
    }

    fn generate(&self, prompt: &EnhancedPrompt) -> Result<Vec<u8>> {
        let payload = build_payload(prompt);
        tracing::debug!(url = %self.api_url, "requesting image from huggingface");

        let response = self
            .agent
            .post(&self.api_url)
            .header("Authorization", &format!("Bearer {}", self.api_key))
            .header("Accept", "image/png")
            .send_json(&payload)
            .map_err(|e| {
                SculptError::UpstreamUnavailable(describe_transport_error("HuggingFace", &e))
            })?;

        let bytes =
            read_success_body("HuggingFace", response).map_err(SculptError::UpstreamUnavailable)?;
        tracing::debug!(bytes = bytes.len(), "huggingface returned image");
        Ok(bytes)
    }
}
