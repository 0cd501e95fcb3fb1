//! Error types for Sculpt

use thiserror::Error;

/// The main error type for Sculpt operations
#[derive(Debug, Error)]
pub enum SculptError {
    /// Empty prompt, empty upload, or bytes that are not an image
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Duplicate request: {0}")]
    DuplicateRequest(String),

    /// A single upstream call failed (transport error, timeout, non-2xx status)
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Image generation exhausted after {attempts} attempt(s)")]
    GenerationExhausted { attempts: u32 },

    #[error("3D conversion failed: {0}")]
    ConversionFailed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Image error: {0}")]
    ImageError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// A config file that is not valid TOML or does not match the schema
    #[error("TOML parse error: {0}")]
    TomlParseError(String),
}

impl SculptError {
    /// Short machine-readable code for the error kind
    pub fn code(&self) -> &'static str {
        match self {
            SculptError::InvalidInput(_) => "invalid_input",
            SculptError::DuplicateRequest(_) => "duplicate_request",
            SculptError::UpstreamUnavailable(_) => "upstream_unavailable",
            SculptError::GenerationExhausted { .. } => "generation_exhausted",
            SculptError::ConversionFailed(_) => "conversion_failed",
            SculptError::ConfigError(_) => "config_error",
            SculptError::ImageError(_) => "image_error",
            SculptError::IoError(_) => "io_error",
            SculptError::TomlParseError(_) => "toml_parse_error",
        }
    }
}

/// Result type alias for Sculpt operations
pub type Result<T> = std::result::Result<T, SculptError>;
