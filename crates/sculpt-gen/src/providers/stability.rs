//! Stability AI image-to-3D provider
//!
//! Submits a PNG to the Stable Fast 3D endpoint as multipart/form-data and
//! receives the GLB in the response body. One request per conversion.

use super::{build_agent, describe_transport_error, read_success_body};
use crate::config::SculptConfig;
use crate::provider::*;
use sculpt_core::{Result, SculptError};
use std::time::Duration;
use ureq::unversioned::multipart::{Form, Part};

const DEFAULT_STABILITY_URL: &str = "https://api.stability.ai/v2beta/3d/stable-fast-3d";

/// Stability AI Stable Fast 3D client
pub struct StabilityConverter {
    api_key: String,
    api_url: String,
    agent: ureq::Agent,
}

impl StabilityConverter {
    /// Create a new StabilityConverter from config
    pub fn from_config(config: &SculptConfig) -> Result<Self> {
        let api_key = config
            .api_key("stability")
            .ok_or_else(|| {
                SculptError::ConfigError(
                    "Stability API key not configured. Set SCULPT_STABILITY_API_KEY or add to .sculpt/config.toml".to_string(),
                )
            })?
            .to_string();

        let api_url = config
            .api_url("stability")
            .unwrap_or(DEFAULT_STABILITY_URL)
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

/// Form fields for one conversion: the PNG as `image`, plus the parameters.
///
/// The caller owns the rendered `foreground_ratio` text since the form
/// borrows every field.
pub fn build_form<'a>(
    image_png: &'a [u8],
    foreground_ratio: &'a str,
    params: &'a ConversionParams,
) -> Result<Form<'a>> {
    let image = Part::bytes(image_png)
        .file_name("image.png")
        .mime_str("image/png")
        .map_err(|e| SculptError::ConversionFailed(format!("Invalid image part: {}", e)))?;

    Ok(Form::new()
        .part("image", image)
        .text("foreground_ratio", foreground_ratio)
        .text("texture_resolution", &params.texture_resolution))
}

impl MeshConverter for StabilityConverter {
    fn name(&self) -> &str {
        "stability"
    }

    fn health_check(&self) -> Result<ProviderStatus> {
        if self.api_key.is_empty() {
            return Ok(ProviderStatus::NoApiKey);
        }
        Ok(ProviderStatus::Available)
    }

    fn convert(&self, image_png: &[u8], params: &ConversionParams) -> Result<Vec<u8>> {
        let foreground_ratio = params.foreground_ratio.to_string();
        let form = build_form(image_png, &foreground_ratio, params)?;
        tracing::debug!(
            url = %self.api_url,
            image_bytes = image_png.len(),
            foreground_ratio = params.foreground_ratio,
            "submitting image to stability"
        );

        let response = self
            .agent
            .post(&self.api_url)
            .header("Authorization", &format!("Bearer {}", self.api_key))
            .send(form)
            .map_err(|e| {
                SculptError::ConversionFailed(describe_transport_error("Stability", &e))
            })?;

        let glb = read_success_body("Stability", response).map_err(SculptError::ConversionFailed)?;
        tracing::debug!(bytes = glb.len(), "stability returned model");
        Ok(glb)
    }
}
