//! Sculpt Gen - prompt and image to 3D model pipeline
//!
//! Enhances text prompts, generates an image through a pluggable text-to-image
//! provider, rejects images whose background is not white (with bounded retry),
//! converts the accepted image to a GLB through an image-to-3D provider, and
//! stores the result. Identical prompts inside a short window are rejected.

pub mod background;
pub mod config;
pub mod convert;
pub mod dedup;
pub mod generate;
pub mod prompt;
pub mod provider;
pub mod providers;
pub mod relay;
pub mod store;

#[cfg(test)]
mod testing;

pub use background::{inspect_background, is_background_white, BackgroundCheck, BackgroundReport};
pub use config::{GenerationConfig, SculptConfig};
pub use convert::{convert_to_3d, ModelAsset};
pub use dedup::{DedupCache, DedupPolicy};
pub use generate::{generate_image, GeneratedImage, GenerationPolicy, MAX_ATTEMPTS};
pub use prompt::{EnhancedPrompt, PromptEnhancer};
pub use provider::{ConversionParams, ImageGenerator, MeshConverter, ProviderKind, ProviderStatus};
pub use relay::{convert_upload, GenerationRequest, Relay, RelayOutput, RelaySettings};
pub use store::ModelStore;
