//! Background check command

use super::load_config;
use anyhow::{Context, Result};
use sculpt_gen::inspect_background;

pub fn run(
    path: &str,
    threshold: Option<u8>,
    margin: Option<u32>,
    format: &str,
    config_path: Option<&str>,
) -> Result<()> {
    let config = load_config(config_path)?;
    let mut check = config.generation.background_check();
    if let Some(t) = threshold {
        check.threshold = t;
    }
    if let Some(m) = margin {
        check.margin_pixels = m;
    }

    let image = image::open(path).with_context(|| format!("Failed to open image {}", path))?;
    let report = inspect_background(&image, &check);

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        _ => report.print_summary(),
    }

    if !report.passed {
        anyhow::bail!("Background of {} is not white", path);
    }
    Ok(())
}
