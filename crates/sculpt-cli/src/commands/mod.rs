//! CLI command implementations

pub mod check;
pub mod generate;
pub mod info;

use anyhow::{Context, Result};
use sculpt_gen::SculptConfig;
use std::path::Path;

/// Load config from an explicit file, or the layered defaults.
///
/// A broken layered config is reported and replaced by defaults; a broken
/// explicit file is an error.
pub fn load_config(path: Option<&str>) -> Result<SculptConfig> {
    match path {
        Some(p) => SculptConfig::load_from_file(Path::new(p))
            .with_context(|| format!("Failed to load config from {}", p)),
        None => Ok(SculptConfig::load().unwrap_or_else(|e| {
            tracing::warn!("Could not load config, using defaults: {}", e);
            SculptConfig::default()
        })),
    }
}
