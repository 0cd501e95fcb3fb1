//! Upstream provider traits and request/result types

use crate::prompt::EnhancedPrompt;
use sculpt_core::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fraction of the frame the object should fill in the reconstructed mesh
pub const DEFAULT_FOREGROUND_RATIO: f64 = 0.85;
/// Texture atlas size requested from the image-to-3D service
pub const DEFAULT_TEXTURE_RESOLUTION: &str = "2048";

/// Which side of the relay a provider sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Text to image
    Image,
    /// Image to 3D model
    Mesh,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Image => write!(f, "image"),
            ProviderKind::Mesh => write!(f, "mesh"),
        }
    }
}

/// Parameters sent with every image-to-3D conversion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionParams {
    #[serde(default = "default_foreground_ratio")]
    pub foreground_ratio: f64,
    #[serde(default = "default_texture_resolution")]
    pub texture_resolution: String,
}

fn default_foreground_ratio() -> f64 {
    DEFAULT_FOREGROUND_RATIO
}

fn default_texture_resolution() -> String {
    DEFAULT_TEXTURE_RESOLUTION.to_string()
}

impl Default for ConversionParams {
    fn default() -> Self {
        Self {
            foreground_ratio: default_foreground_ratio(),
            texture_resolution: default_texture_resolution(),
        }
    }
}

/// Status returned by a provider health check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderStatus {
    Available,
    Unavailable(String),
    NoApiKey,
}

impl fmt::Display for ProviderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderStatus::Available => write!(f, "available"),
            ProviderStatus::Unavailable(reason) => write!(f, "unavailable ({})", reason),
            ProviderStatus::NoApiKey => write!(f, "no API key"),
        }
    }
}

/// Text-to-image upstream (HuggingFace, Mock)
pub trait ImageGenerator: Send + Sync {
    /// Provider name (e.g. "huggingface", "mock")
    fn name(&self) -> &str;

    /// Check if the provider is usable (API key set)
    fn health_check(&self) -> Result<ProviderStatus>;

    /// Make exactly one upstream call and return the raw image bytes.
    ///
    /// Transport failures, timeouts and non-2xx responses are
    /// `SculptError::UpstreamUnavailable`. Implementations never retry.
    fn generate(&self, prompt: &EnhancedPrompt) -> Result<Vec<u8>>;
}

/// Image-to-3D upstream (Stability, Mock)
pub trait MeshConverter: Send + Sync {
    /// Provider name (e.g. "stability", "mock")
    fn name(&self) -> &str;

    fn health_check(&self) -> Result<ProviderStatus>;

    /// Submit one PNG and return the GLB bytes
    fn convert(&self, image_png: &[u8], params: &ConversionParams) -> Result<Vec<u8>>;
}
