//! Layered configuration system
//!
//! Config is loaded with three layers of precedence (highest wins):
//! 1. Environment variables: `SCULPT_{PROVIDER}_API_KEY`, `SCULPT_{PROVIDER}_API_URL`
//! 2. Project-local: `.sculpt/config.toml`
//! 3. Global: `~/.sculpt/config.toml`

use crate::background::{BackgroundCheck, DEFAULT_MARGIN_PIXELS, DEFAULT_THRESHOLD};
use crate::dedup::{DedupPolicy, DEFAULT_WINDOW_SECS};
use crate::generate::{GenerationPolicy, MAX_ATTEMPTS};
use crate::prompt::PromptConfig;
use crate::provider::{ConversionParams, DEFAULT_FOREGROUND_RATIO, DEFAULT_TEXTURE_RESOLUTION};
use sculpt_core::{Result, SculptError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Per-call timeout for upstream HTTP requests
pub const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Providers whose API keys and URLs can be set from the environment
const ENV_PROVIDERS: [&str; 2] = ["huggingface", "stability"];

/// Provider-specific configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

/// Resolved generation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub image_provider: String,
    pub mesh_provider: String,
    pub max_attempts: u32,
    pub request_timeout_secs: u64,
    pub validate_background: bool,
    pub whiteness_threshold: u8,
    pub margin_pixels: u32,
    pub foreground_ratio: f64,
    pub texture_resolution: String,
    pub dedup_window_secs: f64,
    pub dedup_policy: DedupPolicy,
    pub output_dir: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            image_provider: "huggingface".to_string(),
            mesh_provider: "stability".to_string(),
            max_attempts: MAX_ATTEMPTS,
            request_timeout_secs: REQUEST_TIMEOUT_SECS,
            validate_background: true,
            whiteness_threshold: DEFAULT_THRESHOLD,
            margin_pixels: DEFAULT_MARGIN_PIXELS,
            foreground_ratio: DEFAULT_FOREGROUND_RATIO,
            texture_resolution: DEFAULT_TEXTURE_RESOLUTION.to_string(),
            dedup_window_secs: DEFAULT_WINDOW_SECS,
            dedup_policy: DedupPolicy::default(),
            output_dir: "output_models".to_string(),
        }
    }
}

impl GenerationConfig {
    pub fn background_check(&self) -> BackgroundCheck {
        BackgroundCheck {
            threshold: self.whiteness_threshold,
            margin_pixels: self.margin_pixels,
        }
    }

    pub fn generation_policy(&self) -> GenerationPolicy {
        GenerationPolicy {
            max_attempts: self.max_attempts,
            validate_background: self.validate_background,
            check: self.background_check(),
        }
    }

    pub fn conversion_params(&self) -> ConversionParams {
        ConversionParams {
            foreground_ratio: self.foreground_ratio,
            texture_resolution: self.texture_resolution.clone(),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Fails for negative, non-finite or out-of-range values
    pub fn dedup_window(&self) -> Result<Duration> {
        Duration::try_from_secs_f64(self.dedup_window_secs).map_err(|e| {
            SculptError::ConfigError(format!(
                "generation.dedup_window_secs = {} is not a usable window: {}",
                self.dedup_window_secs, e
            ))
        })
    }
}

/// `[generation]` as written in a config file: every key is optional so
/// layers only override what they mention
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationOverrides {
    #[serde(default)]
    pub image_provider: Option<String>,
    #[serde(default)]
    pub mesh_provider: Option<String>,
    #[serde(default)]
    pub max_attempts: Option<u32>,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    #[serde(default)]
    pub validate_background: Option<bool>,
    #[serde(default)]
    pub whiteness_threshold: Option<u8>,
    #[serde(default)]
    pub margin_pixels: Option<u32>,
    #[serde(default)]
    pub foreground_ratio: Option<f64>,
    #[serde(default)]
    pub texture_resolution: Option<String>,
    #[serde(default)]
    pub dedup_window_secs: Option<f64>,
    #[serde(default)]
    pub dedup_policy: Option<DedupPolicy>,
    #[serde(default)]
    pub output_dir: Option<String>,
}

impl GenerationOverrides {
    fn merge(&mut self, overlay: GenerationOverrides) {
        macro_rules! take {
            ($($field:ident),*) => {
                $(if overlay.$field.is_some() { self.$field = overlay.$field; })*
            };
        }
        take!(
            image_provider,
            mesh_provider,
            max_attempts,
            request_timeout_secs,
            validate_background,
            whiteness_threshold,
            margin_pixels,
            foreground_ratio,
            texture_resolution,
            dedup_window_secs,
            dedup_policy,
            output_dir
        );
    }

    fn resolve(self) -> GenerationConfig {
        let d = GenerationConfig::default();
        GenerationConfig {
            image_provider: self.image_provider.unwrap_or(d.image_provider),
            mesh_provider: self.mesh_provider.unwrap_or(d.mesh_provider),
            max_attempts: self.max_attempts.unwrap_or(d.max_attempts),
            request_timeout_secs: self.request_timeout_secs.unwrap_or(d.request_timeout_secs),
            validate_background: self.validate_background.unwrap_or(d.validate_background),
            whiteness_threshold: self.whiteness_threshold.unwrap_or(d.whiteness_threshold),
            margin_pixels: self.margin_pixels.unwrap_or(d.margin_pixels),
            foreground_ratio: self.foreground_ratio.unwrap_or(d.foreground_ratio),
            texture_resolution: self.texture_resolution.unwrap_or(d.texture_resolution),
            dedup_window_secs: self.dedup_window_secs.unwrap_or(d.dedup_window_secs),
            dedup_policy: self.dedup_policy.unwrap_or(d.dedup_policy),
            output_dir: self.output_dir.unwrap_or(d.output_dir),
        }
    }
}

/// Top-level config file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SculptConfigFile {
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    #[serde(default)]
    pub generation: GenerationOverrides,
    #[serde(default)]
    pub prompt: PromptConfig,
}

/// Resolved configuration with environment variable overrides applied
#[derive(Debug, Clone, Default)]
pub struct SculptConfig {
    pub providers: HashMap<String, ProviderConfig>,
    pub generation: GenerationConfig,
    pub prompt: PromptConfig,
}

impl SculptConfig {
    /// Load config with layered precedence: global < project < env vars
    pub fn load() -> Result<Self> {
        let mut config = SculptConfigFile::default();

        // Layer 1: Global config (~/.sculpt/config.toml)
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                let global = Self::load_file(&global_path)?;
                Self::merge_into(&mut config, global);
            }
        }

        // Layer 2: Project-local config (.sculpt/config.toml)
        let local_path = PathBuf::from(".sculpt/config.toml");
        if local_path.exists() {
            let local = Self::load_file(&local_path)?;
            Self::merge_into(&mut config, local);
        }

        // Layer 3: Environment variable overrides
        Self::apply_env_overrides(&mut config);

        Self::resolve(config)
    }

    /// Load config from a specific file path only (plus env overrides)
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let mut config = Self::load_file(path)?;
        Self::apply_env_overrides(&mut config);
        Self::resolve(config)
    }

    /// Get API key for a provider
    pub fn api_key(&self, provider_name: &str) -> Option<&str> {
        self.providers
            .get(provider_name)
            .and_then(|p| p.api_key.as_deref())
            .filter(|k| !k.is_empty())
    }

    /// Get API URL override for a provider
    pub fn api_url(&self, provider_name: &str) -> Option<&str> {
        self.providers
            .get(provider_name)
            .and_then(|p| p.api_url.as_deref())
    }

    /// Check if a provider is enabled
    pub fn is_enabled(&self, provider_name: &str) -> bool {
        self.providers
            .get(provider_name)
            .map(|p| p.enabled)
            .unwrap_or(true)
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".sculpt").join("config.toml"))
    }

    fn load_file(path: &Path) -> Result<SculptConfigFile> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| SculptError::TomlParseError(format!("{}: {}", path.display(), e)))
    }

    fn merge_into(base: &mut SculptConfigFile, overlay: SculptConfigFile) {
        for (name, provider) in overlay.providers {
            let entry = base.providers.entry(name).or_default();
            if provider.api_key.is_some() {
                entry.api_key = provider.api_key;
            }
            if provider.api_url.is_some() {
                entry.api_url = provider.api_url;
            }
            entry.enabled = provider.enabled;
        }

        base.generation.merge(overlay.generation);

        if overlay.prompt.suffix.is_some() {
            base.prompt.suffix = overlay.prompt.suffix;
        }
        if overlay.prompt.negative.is_some() {
            base.prompt.negative = overlay.prompt.negative;
        }
    }

    fn apply_env_overrides(config: &mut SculptConfigFile) {
        for name in &ENV_PROVIDERS {
            let upper = name.to_uppercase();
            if let Ok(key) = std::env::var(format!("SCULPT_{}_API_KEY", upper)) {
                let entry = config.providers.entry(name.to_string()).or_default();
                entry.api_key = Some(key);
            }
            if let Ok(url) = std::env::var(format!("SCULPT_{}_API_URL", upper)) {
                let entry = config.providers.entry(name.to_string()).or_default();
                entry.api_url = Some(url);
            }
        }
    }

    fn resolve(file: SculptConfigFile) -> Result<Self> {
        let generation = file.generation.resolve();
        generation.dedup_window()?;
        Ok(SculptConfig {
            providers: file.providers,
            generation,
            prompt: file.prompt,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_config(content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("sculpt_config_test_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    fn cleanup(path: &Path) {
        std::fs::remove_file(path).ok();
        std::fs::remove_dir(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_load_config_from_file() {
        let config_str = r#"
[providers.huggingface]
api_url = "https://hf.example.com/flux"
enabled = true

[providers.stability]
enabled = false

[generation]
max_attempts = 5
whiteness_threshold = 230
dedup_policy = "per_key"
output_dir = "models"

[prompt]
negative = "people"
"#;
        let path = temp_config(config_str);
        let config = SculptConfig::load_from_file(&path).unwrap();

        assert!(config.is_enabled("huggingface"));
        assert!(!config.is_enabled("stability"));
        assert_eq!(config.api_url("huggingface"), Some("https://hf.example.com/flux"));
        assert_eq!(config.generation.max_attempts, 5);
        assert_eq!(config.generation.whiteness_threshold, 230);
        assert_eq!(config.generation.dedup_policy, DedupPolicy::PerKey);
        assert_eq!(config.generation.output_dir, "models");
        // untouched keys keep their defaults
        assert_eq!(config.generation.margin_pixels, DEFAULT_MARGIN_PIXELS);
        assert_eq!(config.generation.texture_resolution, "2048");
        assert_eq!(config.prompt.negative.as_deref(), Some("people"));

        cleanup(&path);
    }

    #[test]
    fn test_env_var_override() {
        let config_str = r#"
[providers.stability]
api_key = "file-key"
"#;
        let path = temp_config(config_str);

        std::env::set_var("SCULPT_STABILITY_API_KEY", "env-key-override");
        let config = SculptConfig::load_from_file(&path).unwrap();
        std::env::remove_var("SCULPT_STABILITY_API_KEY");

        assert_eq!(config.api_key("stability"), Some("env-key-override"));
        cleanup(&path);
    }

    #[test]
    fn test_defaults() {
        let config = SculptConfig::default();
        let gen = &config.generation;
        assert_eq!(gen.image_provider, "huggingface");
        assert_eq!(gen.mesh_provider, "stability");
        assert_eq!(gen.max_attempts, 3);
        assert_eq!(gen.request_timeout(), Duration::from_secs(60));
        assert_eq!(gen.dedup_window().unwrap(), Duration::from_secs(2));
        assert_eq!(gen.dedup_policy, DedupPolicy::GlobalReset);
        assert!(gen.validate_background);
        assert_eq!(gen.background_check(), BackgroundCheck::default());
        assert_eq!(gen.conversion_params(), ConversionParams::default());
    }

    #[test]
    fn test_merge_layers() {
        let mut base: SculptConfigFile = toml::from_str(
            r#"
[providers.huggingface]
api_key = "global-key"

[generation]
max_attempts = 4
foreground_ratio = 0.9
"#,
        )
        .unwrap();
        let overlay: SculptConfigFile = toml::from_str(
            r#"
[providers.huggingface]
api_url = "http://localhost:9000"

[generation]
max_attempts = 2
"#,
        )
        .unwrap();

        SculptConfig::merge_into(&mut base, overlay);
        let config = SculptConfig::resolve(base).unwrap();

        assert_eq!(config.api_key("huggingface"), Some("global-key"));
        assert_eq!(config.api_url("huggingface"), Some("http://localhost:9000"));
        assert_eq!(config.generation.max_attempts, 2);
        assert_eq!(config.generation.foreground_ratio, 0.9);
    }

    #[test]
    fn test_missing_provider_returns_none() {
        let config = SculptConfig::default();
        assert_eq!(config.api_key("nonexistent"), None);
        assert!(config.is_enabled("nonexistent"));
    }

    #[test]
    fn test_empty_api_key_is_none() {
        let mut config = SculptConfig::default();
        config.providers.insert(
            "huggingface".to_string(),
            ProviderConfig {
                api_key: Some(String::new()),
                api_url: None,
                enabled: true,
            },
        );
        assert_eq!(config.api_key("huggingface"), None);
    }

    #[test]
    fn test_invalid_file_is_parse_error() {
        let path = temp_config("[generation\nmax_attempts = ");
        match SculptConfig::load_from_file(&path) {
            Err(SculptError::TomlParseError(msg)) => assert!(msg.contains("config.toml")),
            other => panic!("expected TomlParseError, got {:?}", other),
        }
        cleanup(&path);
    }

    #[test]
    fn test_unusable_dedup_window_is_config_error() {
        for value in ["1e20", "inf", "nan", "-1.0"] {
            let path = temp_config(&format!("[generation]\ndedup_window_secs = {}\n", value));
            match SculptConfig::load_from_file(&path) {
                Err(SculptError::ConfigError(msg)) => assert!(msg.contains("dedup_window_secs")),
                other => panic!("{}: expected ConfigError, got {:?}", value, other),
            }
            cleanup(&path);
        }
    }

    #[test]
    fn test_dedup_window_bounds() {
        let mut gen = GenerationConfig::default();
        gen.dedup_window_secs = 0.0;
        assert_eq!(gen.dedup_window().unwrap(), Duration::ZERO);
        gen.dedup_window_secs = 0.5;
        assert_eq!(gen.dedup_window().unwrap(), Duration::from_millis(500));
        gen.dedup_window_secs = f64::INFINITY;
        assert!(matches!(gen.dedup_window(), Err(SculptError::ConfigError(_))));
    }
}
