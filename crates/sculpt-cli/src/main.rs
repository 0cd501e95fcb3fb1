//! Sculpt CLI - Command-line interface for prompt/image to 3D generation

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{check, generate, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sculpt")]
#[command(about = "Turn a text prompt or an image into a 3D model", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Load config from this file instead of ~/.sculpt and .sculpt
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a 3D model from a text prompt
    Text {
        /// Text prompt describing a single object
        #[arg(short, long)]
        prompt: String,

        /// Text-to-image provider (huggingface, mock)
        #[arg(long)]
        provider: Option<String>,

        /// Image-to-3D provider (stability, mock)
        #[arg(long)]
        converter: Option<String>,

        /// Directory the .glb is written to
        #[arg(short, long)]
        output: Option<String>,

        /// Print the JSON response body instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Convert an existing image to a 3D model
    Image {
        /// Path to the image file
        path: String,

        /// Image-to-3D provider (stability, mock)
        #[arg(long)]
        converter: Option<String>,

        /// Directory the .glb is written to
        #[arg(short, long)]
        output: Option<String>,

        /// Print the JSON response body instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Check whether an image has a white background
    Check {
        /// Path to the image file
        path: String,

        /// Minimum mean channel value for each border band (0-255)
        #[arg(long)]
        threshold: Option<u8>,

        /// Border band width in pixels
        #[arg(long)]
        margin: Option<u32>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Show the enhanced prompt that would be sent upstream
    Prompt {
        /// Text prompt
        text: String,
    },

    /// List available providers and their status
    Providers,
}

impl Commands {
    fn wants_json(&self) -> bool {
        match self {
            Commands::Text { json, .. } | Commands::Image { json, .. } => *json,
            _ => false,
        }
    }
}

/// Logs go to stderr so `--json` output on stdout stays parseable
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let json = cli.command.wants_json();
    let config = cli.config;

    let result = match cli.command {
        Commands::Text {
            prompt,
            provider,
            converter,
            output,
            json,
        } => generate::run_text(generate::TextArgs {
            prompt,
            provider,
            converter,
            output,
            json,
            config,
        }),
        Commands::Image {
            path,
            converter,
            output,
            json,
        } => generate::run_image(generate::ImageArgs {
            path,
            converter,
            output,
            json,
            config,
        }),
        Commands::Check {
            path,
            threshold,
            margin,
            format,
        } => check::run(&path, threshold, margin, &format, config.as_deref()),
        Commands::Prompt { text } => info::run_prompt(&text, config.as_deref()),
        Commands::Providers => info::run_providers(config.as_deref()),
    };

    match result {
        Err(e) if json => {
            println!("{}", output::error_body(&e));
            std::process::exit(1);
        }
        other => other,
    }
}
