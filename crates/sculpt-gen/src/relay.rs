//! End-to-end pipeline: prompt or uploaded image in, GLB and thumbnail out
//!
//! Text requests pass the dedup gate, are enhanced, generated with retry,
//! converted once and stored. Uploaded images skip generation, validation and
//! dedup and go straight to conversion.

use crate::config::{GenerationConfig, SculptConfig};
use crate::convert::{convert_png, encode_png, ModelAsset};
use crate::dedup::{DedupCache, DedupPolicy, DEFAULT_WINDOW_SECS};
use crate::generate::{generate_from_enhanced, GenerationPolicy};
use crate::prompt::PromptEnhancer;
use crate::provider::{ConversionParams, ImageGenerator, MeshConverter};
use crate::providers::{create_image_generator, create_mesh_converter};
use crate::store::ModelStore;
use sculpt_core::{Result, SculptError};
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// One inbound text request
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub id: Uuid,
    pub raw_prompt: String,
    pub submitted_at: Instant,
}

impl GenerationRequest {
    pub fn new(raw_prompt: &str) -> Self {
        Self::at(raw_prompt, Instant::now())
    }

    pub fn at(raw_prompt: &str, submitted_at: Instant) -> Self {
        Self {
            id: Uuid::new_v4(),
            raw_prompt: raw_prompt.to_string(),
            submitted_at,
        }
    }
}

/// Everything the relay needs besides the providers
#[derive(Debug, Clone)]
pub struct RelaySettings {
    pub generation: GenerationPolicy,
    pub conversion: ConversionParams,
    pub dedup_window: Duration,
    pub dedup_policy: DedupPolicy,
    pub enhancer: PromptEnhancer,
}

impl Default for RelaySettings {
    fn default() -> Self {
        let gen = GenerationConfig::default();
        Self {
            generation: gen.generation_policy(),
            conversion: gen.conversion_params(),
            dedup_window: Duration::from_secs_f64(DEFAULT_WINDOW_SECS),
            dedup_policy: gen.dedup_policy,
            enhancer: PromptEnhancer::default(),
        }
    }
}

impl RelaySettings {
    pub fn from_config(config: &SculptConfig) -> Result<Self> {
        let gen = &config.generation;
        Ok(Self {
            generation: gen.generation_policy(),
            conversion: gen.conversion_params(),
            dedup_window: gen.dedup_window()?,
            dedup_policy: gen.dedup_policy,
            enhancer: PromptEnhancer::from_config(&config.prompt),
        })
    }
}

/// Result of a completed request
#[derive(Debug, Clone)]
pub struct RelayOutput {
    pub request_id: Uuid,
    /// Human-readable summary, e.g. `Processing text: a red cube`
    pub message: String,
    pub model: ModelAsset,
    pub thumbnail_png: Vec<u8>,
    /// Enhanced prompt sent upstream; `None` for uploaded images
    pub prompt_used: Option<String>,
    /// Generation attempts spent; 0 for uploaded images
    pub attempts: u32,
    pub duration_secs: f64,
}

pub struct Relay {
    generator: Arc<dyn ImageGenerator>,
    converter: Arc<dyn MeshConverter>,
    settings: RelaySettings,
    dedup: DedupCache,
    store: Option<ModelStore>,
}

impl Relay {
    pub fn new(
        generator: Arc<dyn ImageGenerator>,
        converter: Arc<dyn MeshConverter>,
        settings: RelaySettings,
    ) -> Self {
        let dedup = DedupCache::new(settings.dedup_window, settings.dedup_policy);
        Self {
            generator,
            converter,
            settings,
            dedup,
            store: None,
        }
    }

    /// Build providers, settings and store from config
    pub fn from_config(config: &SculptConfig) -> Result<Self> {
        let gen = &config.generation;
        let settings = RelaySettings::from_config(config)?;
        let generator = create_image_generator(&gen.image_provider, config)?;
        let converter = create_mesh_converter(&gen.mesh_provider, config)?;
        Ok(Self::new(Arc::from(generator), Arc::from(converter), settings)
        .with_store(ModelStore::new(&gen.output_dir)))
    }

    /// Persist models to `store` and return the stored bytes
    pub fn with_store(mut self, store: ModelStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn settings(&self) -> &RelaySettings {
        &self.settings
    }

    pub fn dedup(&self) -> &DedupCache {
        &self.dedup
    }

    pub fn generator_name(&self) -> &str {
        self.generator.name()
    }

    pub fn converter_name(&self) -> &str {
        self.converter.name()
    }

    /// Text to 3D
    pub fn from_text(&self, prompt: &str) -> Result<RelayOutput> {
        self.handle(GenerationRequest::new(prompt))
    }

    /// Run a text request, using `request.submitted_at` as the dedup clock
    pub fn handle(&self, request: GenerationRequest) -> Result<RelayOutput> {
        let start = Instant::now();
        let prompt = request.raw_prompt.trim();
        if prompt.is_empty() {
            return Err(SculptError::InvalidInput("No text provided".to_string()));
        }

        if self.dedup.check_and_record(prompt, request.submitted_at) {
            return Err(SculptError::DuplicateRequest(format!(
                "'{}' was submitted less than {:.1}s ago",
                prompt,
                self.settings.dedup_window.as_secs_f64()
            )));
        }

        tracing::info!(request_id = %request.id, prompt, "received text request");

        let enhanced = self.settings.enhancer.build(prompt);
        let generated =
            generate_from_enhanced(self.generator.as_ref(), &enhanced, &self.settings.generation)?;

        let thumbnail_png = encode_png(&generated.image)?;
        let model = convert_png(
            self.converter.as_ref(),
            &thumbnail_png,
            &self.settings.conversion,
        )?;
        let model = persist(self.store.as_ref(), prompt, model)?;

        let duration_secs = start.elapsed().as_secs_f64();
        tracing::info!(
            request_id = %request.id,
            attempts = generated.attempt,
            model_bytes = model.len(),
            duration_secs,
            "text request complete"
        );

        Ok(RelayOutput {
            request_id: request.id,
            message: format!("Processing text: {}", prompt),
            model,
            thumbnail_png,
            prompt_used: Some(enhanced.prompt),
            attempts: generated.attempt,
            duration_secs,
        })
    }

    /// Uploaded image to 3D. `name` is the upload's file name.
    pub fn from_image(&self, name: &str, bytes: &[u8]) -> Result<RelayOutput> {
        convert_upload(
            self.converter.as_ref(),
            &self.settings.conversion,
            self.store.as_ref(),
            name,
            bytes,
        )
    }
}

/// Convert an uploaded image without generation, validation or dedup
pub fn convert_upload(
    converter: &dyn MeshConverter,
    params: &ConversionParams,
    store: Option<&ModelStore>,
    name: &str,
    bytes: &[u8],
) -> Result<RelayOutput> {
    let start = Instant::now();
    let request_id = Uuid::new_v4();

    if bytes.is_empty() {
        return Err(SculptError::InvalidInput("No image provided".to_string()));
    }
    if name.trim().is_empty() {
        return Err(SculptError::InvalidInput("No image selected".to_string()));
    }
    let image = image::load_from_memory(bytes)
        .map_err(|e| SculptError::InvalidInput(format!("Error processing image: {}", e)))?;

    tracing::info!(
        request_id = %request_id,
        name,
        width = image.width(),
        height = image.height(),
        "received image upload"
    );

    let thumbnail_png = encode_png(&image)?;
    let model = convert_png(converter, &thumbnail_png, params)?;
    let model = persist(store, name, model)?;

    Ok(RelayOutput {
        request_id,
        message: format!("Processing image: {}", name),
        model,
        thumbnail_png,
        prompt_used: None,
        attempts: 0,
        duration_secs: start.elapsed().as_secs_f64(),
    })
}

fn persist(store: Option<&ModelStore>, name: &str, model: ModelAsset) -> Result<ModelAsset> {
    match store {
        Some(store) => store.persist(name, model),
        None => Ok(model),
    }
}
