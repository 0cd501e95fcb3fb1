//! Text-to-3D and image-to-3D commands

use super::load_config;
use crate::output::response_body;
use anyhow::{Context, Result};
use sculpt_gen::providers::create_mesh_converter;
use sculpt_gen::{convert_upload, MeshConverter, ModelStore, Relay, RelayOutput, SculptConfig};
use std::path::Path;

pub struct TextArgs {
    pub prompt: String,
    pub provider: Option<String>,
    pub converter: Option<String>,
    pub output: Option<String>,
    pub json: bool,
    pub config: Option<String>,
}

pub struct ImageArgs {
    pub path: String,
    pub converter: Option<String>,
    pub output: Option<String>,
    pub json: bool,
    pub config: Option<String>,
}

/// Apply command-line overrides on top of the loaded config
fn apply_overrides(
    config: &mut SculptConfig,
    provider: Option<String>,
    converter: Option<String>,
    output: Option<String>,
) {
    if let Some(p) = provider {
        config.generation.image_provider = p;
    }
    if let Some(c) = converter {
        config.generation.mesh_provider = c;
    }
    if let Some(o) = output {
        config.generation.output_dir = o;
    }
}

pub fn run_text(args: TextArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    apply_overrides(&mut config, args.provider, args.converter, args.output);

    // One relay per invocation: the dedup window never spans two runs
    let relay = Relay::from_config(&config)?;

    if !args.json {
        println!(
            "Generating '{}' via {} -> {}...",
            args.prompt.trim(),
            relay.generator_name(),
            relay.converter_name()
        );
    }

    let out = relay.from_text(&args.prompt)?;
    report(&out, args.json)
}

pub fn run_image(args: ImageArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    apply_overrides(&mut config, None, args.converter, args.output);

    let path = Path::new(&args.path);
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read image {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| args.path.clone());

    let gen = &config.generation;
    let converter = create_mesh_converter(&gen.mesh_provider, &config)?;
    let store = ModelStore::new(&gen.output_dir);

    if !args.json {
        println!("Converting '{}' via {}...", name, converter.name());
    }

    let out = convert_upload(
        converter.as_ref(),
        &gen.conversion_params(),
        Some(&store),
        &name,
        &bytes,
    )?;
    report(&out, args.json)
}

fn report(out: &RelayOutput, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(&response_body(out))?);
        return Ok(());
    }

    println!("  {}", out.message);
    if let Some(ref prompt) = out.prompt_used {
        println!("  Prompt: {}", prompt);
        println!("  Attempts: {}", out.attempts);
    }
    println!("  Model: {} bytes ({})", out.model.len(), out.model.content_hash);
    if let Some(ref path) = out.model.path {
        println!("  Saved: {}", path.display());
    }
    println!("  Thumbnail: {} bytes PNG", out.thumbnail_png.len());
    println!("  Done in {:.1}s", out.duration_secs);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_overrides() {
        let mut config = SculptConfig::default();
        apply_overrides(
            &mut config,
            Some("mock".to_string()),
            None,
            Some("out".to_string()),
        );
        assert_eq!(config.generation.image_provider, "mock");
        assert_eq!(config.generation.mesh_provider, "stability");
        assert_eq!(config.generation.output_dir, "out");
    }
}
