//! Prompt preview and provider listing

use super::load_config;
use anyhow::Result;
use sculpt_gen::provider::{ImageGenerator, MeshConverter, ProviderKind, ProviderStatus};
use sculpt_gen::providers::{available_providers, create_image_generator, create_mesh_converter};
use sculpt_gen::{PromptEnhancer, SculptConfig};

pub fn run_prompt(text: &str, config_path: Option<&str>) -> Result<()> {
    let config = load_config(config_path)?;
    let built = PromptEnhancer::from_config(&config.prompt).build(text.trim());
    println!("Prompt: {}", built.prompt);
    println!("Negative: {}", built.negative_prompt);
    Ok(())
}

pub fn run_providers(config_path: Option<&str>) -> Result<()> {
    let config = load_config(config_path)?;

    for kind in [ProviderKind::Image, ProviderKind::Mesh] {
        let default = match kind {
            ProviderKind::Image => &config.generation.image_provider,
            ProviderKind::Mesh => &config.generation.mesh_provider,
        };
        println!("{} providers:", kind);
        for name in available_providers(kind) {
            let marker = if name == default.as_str() { "*" } else { " " };
            println!("  {} {:<12} {}", marker, name, status_line(kind, name, &config));
        }
    }
    Ok(())
}

fn status_line(kind: ProviderKind, name: &str, config: &SculptConfig) -> String {
    let status = match kind {
        ProviderKind::Image => create_image_generator(name, config).and_then(|p| p.health_check()),
        ProviderKind::Mesh => create_mesh_converter(name, config).and_then(|p| p.health_check()),
    };
    match status {
        Ok(ProviderStatus::Available) => "available".to_string(),
        Ok(other) => other.to_string(),
        Err(e) => e.to_string(),
    }
}
