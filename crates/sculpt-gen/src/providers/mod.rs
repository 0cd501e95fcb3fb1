//! Provider registry
//!
//! Maps provider names to concrete implementations, plus the blocking HTTP
//! plumbing shared by the network-backed providers.

pub mod huggingface;
pub mod mock;
pub mod stability;

use crate::config::SculptConfig;
use crate::provider::{ImageGenerator, MeshConverter, ProviderKind};
use sculpt_core::{Result, SculptError};
use std::io::Read;
use std::time::Duration;

/// Longest slice of an upstream error body kept in logs and messages
const ERROR_BODY_LIMIT: usize = 512;

/// Create a text-to-image provider by name with configuration
pub fn create_image_generator(
    name: &str,
    config: &SculptConfig,
) -> Result<Box<dyn ImageGenerator>> {
    ensure_enabled(name, config)?;
    match name {
        "mock" => Ok(Box::new(mock::MockImageGenerator::new())),
        "huggingface" => Ok(Box::new(huggingface::HuggingFaceGenerator::from_config(
            config,
        )?)),
        _ => Err(SculptError::ConfigError(format!(
            "Unknown image provider '{}'. Available: {}",
            name,
            available_providers(ProviderKind::Image).join(", ")
        ))),
    }
}

/// Create an image-to-3D provider by name with configuration
pub fn create_mesh_converter(name: &str, config: &SculptConfig) -> Result<Box<dyn MeshConverter>> {
    ensure_enabled(name, config)?;
    match name {
        "mock" => Ok(Box::new(mock::MockConverter::new())),
        "stability" => Ok(Box::new(stability::StabilityConverter::from_config(config)?)),
        _ => Err(SculptError::ConfigError(format!(
            "Unknown mesh provider '{}'. Available: {}",
            name,
            available_providers(ProviderKind::Mesh).join(", ")
        ))),
    }
}

/// List provider names for one side of the relay
pub fn available_providers(kind: ProviderKind) -> Vec<&'static str> {
    match kind {
        ProviderKind::Image => vec!["mock", "huggingface"],
        ProviderKind::Mesh => vec!["mock", "stability"],
    }
}

fn ensure_enabled(name: &str, config: &SculptConfig) -> Result<()> {
    if config.is_enabled(name) {
        Ok(())
    } else {
        Err(SculptError::ConfigError(format!(
            "Provider '{}' is disabled in config",
            name
        )))
    }
}

/// Blocking agent with a global per-call timeout.
///
/// Status codes are not turned into errors so the error body can be logged.
pub(crate) fn build_agent(timeout: Duration) -> ureq::Agent {
    let config = ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build();
    config.into()
}

/// Read a 2xx body, or describe a non-2xx response as an error message
pub(crate) fn read_success_body(
    provider: &str,
    response: ureq::http::Response<ureq::Body>,
) -> std::result::Result<Vec<u8>, String> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .into_body()
            .read_to_string()
            .unwrap_or_default();
        let body = truncate_text(&body, ERROR_BODY_LIMIT);
        tracing::warn!(provider, status = status.as_u16(), body = %body, "upstream returned an error status");
        return Err(format!("{} returned HTTP {}: {}", provider, status.as_u16(), body));
    }

    let mut reader = response.into_body().into_reader();
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|e| format!("Failed to read {} response body: {}", provider, e))?;
    Ok(bytes)
}

/// Human-readable description of a transport-level failure
pub(crate) fn describe_transport_error(provider: &str, e: &ureq::Error) -> String {
    match e {
        ureq::Error::Timeout(_) => format!("{} request timed out", provider),
        ureq::Error::ConnectionFailed => format!("Could not connect to {}", provider),
        ureq::Error::HostNotFound => format!("{} host not found", provider),
        other => format!("{} request failed: {}", provider, other),
    }
}

fn truncate_text(text: &str, limit: usize) -> String {
    let trimmed = text.trim();
    match trimmed.char_indices().nth(limit) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}
