//! Image generation with background validation and bounded retry
//!
//! Each attempt makes one upstream call, decodes the bytes and runs the
//! background check. Transport errors, undecodable bodies and rejected
//! backgrounds all consume one attempt; there is no delay between attempts.

use crate::background::{inspect_background, BackgroundCheck, BackgroundReport};
use crate::prompt::{EnhancedPrompt, PromptEnhancer};
use crate::provider::ImageGenerator;
use image::DynamicImage;
use sculpt_core::{Result, SculptError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default number of upstream calls per generation
pub const MAX_ATTEMPTS: u32 = 3;

/// Retry and validation settings for one generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationPolicy {
    pub max_attempts: u32,
    pub validate_background: bool,
    pub check: BackgroundCheck,
}

impl Default for GenerationPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            validate_background: true,
            check: BackgroundCheck::default(),
        }
    }
}

impl GenerationPolicy {
    /// Attempts actually allowed; a configured 0 still makes one call
    pub fn budget(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

/// An image that passed (or skipped) validation
#[derive(Debug, Clone)]
pub struct GeneratedImage {
    pub image: DynamicImage,
    /// 1-based attempt that produced this image
    pub attempt: u32,
    /// `None` when background validation is disabled
    pub report: Option<BackgroundReport>,
}

/// How a single attempt ended
#[derive(Debug)]
pub enum AttemptOutcome {
    Accepted(GeneratedImage),
    /// Decoded, but the border bands were not white
    Rejected(BackgroundReport),
    /// 2xx body that the image decoder could not read
    Undecodable(String),
    /// Transport error, timeout or non-2xx status
    Transport(SculptError),
}

impl fmt::Display for AttemptOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptOutcome::Accepted(img) => write!(f, "accepted on attempt {}", img.attempt),
            AttemptOutcome::Rejected(report) => match report.darkest_band() {
                Some(band) => write!(
                    f,
                    "background not white ({} band min channel {:.1} < {})",
                    band.band,
                    band.min_channel(),
                    report.threshold
                ),
                None => write!(f, "background not white (empty image)"),
            },
            AttemptOutcome::Undecodable(msg) => write!(f, "undecodable image: {}", msg),
            AttemptOutcome::Transport(err) => write!(f, "{}", err),
        }
    }
}

/// Position in the retry loop
#[derive(Debug)]
pub enum AttemptState {
    /// About to make the n-th call (1-based)
    Attempting(u32),
    Succeeded(GeneratedImage),
    Exhausted { attempts: u32 },
}

impl AttemptState {
    pub fn start() -> Self {
        AttemptState::Attempting(1)
    }

    /// Transition after attempt `n` ended with `outcome`
    pub fn after(n: u32, outcome: AttemptOutcome, budget: u32) -> Self {
        match outcome {
            AttemptOutcome::Accepted(image) => AttemptState::Succeeded(image),
            _ if n >= budget => AttemptState::Exhausted { attempts: n },
            _ => AttemptState::Attempting(n + 1),
        }
    }
}

/// Enhance `prompt`, then generate until an image passes or the budget runs out
pub fn generate_image(
    generator: &dyn ImageGenerator,
    enhancer: &PromptEnhancer,
    policy: &GenerationPolicy,
    prompt: &str,
) -> Result<GeneratedImage> {
    let enhanced = enhancer.build(prompt);
    generate_from_enhanced(generator, &enhanced, policy)
}

/// Run the retry loop for an already-enhanced prompt
pub fn generate_from_enhanced(
    generator: &dyn ImageGenerator,
    prompt: &EnhancedPrompt,
    policy: &GenerationPolicy,
) -> Result<GeneratedImage> {
    let budget = policy.budget();
    let mut state = AttemptState::start();

    loop {
        state = match state {
            AttemptState::Attempting(n) => {
                tracing::info!(
                    provider = generator.name(),
                    attempt = n,
                    max_attempts = budget,
                    "generating image"
                );
                let outcome = run_attempt(generator, prompt, policy, n);
                if !matches!(outcome, AttemptOutcome::Accepted(_)) {
                    tracing::warn!(attempt = n, max_attempts = budget, "attempt failed: {}", outcome);
                }
                AttemptState::after(n, outcome, budget)
            }
            AttemptState::Succeeded(image) => {
                tracing::info!(attempt = image.attempt, "image accepted");
                return Ok(image);
            }
            AttemptState::Exhausted { attempts } => {
                return Err(SculptError::GenerationExhausted { attempts });
            }
        };
    }
}

/// One upstream call plus decode and validation
fn run_attempt(
    generator: &dyn ImageGenerator,
    prompt: &EnhancedPrompt,
    policy: &GenerationPolicy,
    attempt: u32,
) -> AttemptOutcome {
    let bytes = match generator.generate(prompt) {
        Ok(bytes) => bytes,
        Err(e) => return AttemptOutcome::Transport(e),
    };

    let image = match image::load_from_memory(&bytes) {
        Ok(image) => image,
        Err(e) => return AttemptOutcome::Undecodable(e.to_string()),
    };

    if !policy.validate_background {
        return AttemptOutcome::Accepted(GeneratedImage {
            image,
            attempt,
            report: None,
        });
    }

    let report = inspect_background(&image, &policy.check);
    if report.passed {
        AttemptOutcome::Accepted(GeneratedImage {
            image,
            attempt,
            report: Some(report),
        })
    } else {
        AttemptOutcome::Rejected(report)
    }
}
