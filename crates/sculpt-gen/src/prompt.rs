//! Prompt enhancement for image-to-3D friendly framing
//!
//! User prompts are extended with fixed clauses that push the text-to-image
//! model toward one centered object on a plain white backdrop, which is what
//! both the background check and the 3D converter expect.

use serde::{Deserialize, Serialize};

/// Clauses appended to every prompt, in order
pub const DEFAULT_SUFFIX: &[&str] = &[
    "single object centered in frame",
    "full object visible with empty space on all sides",
    "three-quarter view",
    "soft even studio lighting",
    "no cast shadows",
    "isolated on a pure white background",
];

/// Things the image model must avoid
pub const DEFAULT_NEGATIVE_PROMPT: &str = "cropped, cut off, multiple objects, text, watermark, \
     logo, shadows, reflections, colored background, gradient background, textured background, \
     scenery, frame, border";

/// Optional `[prompt]` section of the config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptConfig {
    #[serde(default)]
    pub suffix: Option<Vec<String>>,
    #[serde(default)]
    pub negative: Option<String>,
}

/// A prompt ready to send to the text-to-image upstream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnhancedPrompt {
    pub prompt: String,
    pub negative_prompt: String,
}

/// Appends fixed composition, lighting and background clauses to prompts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptEnhancer {
    suffix: Vec<String>,
    negative_prompt: String,
}

impl Default for PromptEnhancer {
    fn default() -> Self {
        Self {
            suffix: DEFAULT_SUFFIX.iter().map(|s| s.to_string()).collect(),
            negative_prompt: DEFAULT_NEGATIVE_PROMPT.to_string(),
        }
    }
}

impl PromptEnhancer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an enhancer from the config file, falling back to the defaults
    /// for anything not overridden
    pub fn from_config(config: &PromptConfig) -> Self {
        let mut enhancer = Self::default();
        if let Some(ref suffix) = config.suffix {
            enhancer.suffix = suffix
                .iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Some(ref negative) = config.negative {
            enhancer.negative_prompt = negative.trim().to_string();
        }
        enhancer
    }

    /// Append the framing clauses to `prompt`.
    ///
    /// The result always starts with the prompt unchanged.
    pub fn enhance(&self, prompt: &str) -> String {
        if self.suffix.is_empty() {
            return prompt.to_string();
        }
        format!("{}, {}", prompt, self.suffix.join(", "))
    }

    pub fn negative_prompt(&self) -> &str {
        &self.negative_prompt
    }

    pub fn suffix(&self) -> &[String] {
        &self.suffix
    }

    /// Enhanced prompt plus the negative constraint
    pub fn build(&self, prompt: &str) -> EnhancedPrompt {
        EnhancedPrompt {
            prompt: self.enhance(prompt),
            negative_prompt: self.negative_prompt.clone(),
        }
    }
}
