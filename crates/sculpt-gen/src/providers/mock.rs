//! Mock providers for testing
//!
//! Generates a white-background PNG (text-to-image) and a minimal GLB
//! (image-to-3D) without any network calls.

use crate::convert::encode_png;
use crate::prompt::EnhancedPrompt;
use crate::provider::*;
use image::{DynamicImage, Rgb, RgbImage};
use sculpt_core::{Result, SculptError};

const MOCK_IMAGE_SIZE: u32 = 256;

/// Renders a colored square centered on a white canvas
#[derive(Debug, Clone)]
pub struct MockImageGenerator {
    size: u32,
}

impl Default for MockImageGenerator {
    fn default() -> Self {
        Self {
            size: MOCK_IMAGE_SIZE,
        }
    }
}

impl MockImageGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_size(size: u32) -> Self {
        Self { size: size.max(1) }
    }
}

impl ImageGenerator for MockImageGenerator {
    fn name(&self) -> &str {
        "mock"
    }

    fn health_check(&self) -> Result<ProviderStatus> {
        Ok(ProviderStatus::Available)
    }

    fn generate(&self, prompt: &EnhancedPrompt) -> Result<Vec<u8>> {
        let image = render_object_on_white(&prompt.prompt, self.size);
        encode_png(&image)
    }
}

/// Returns a fixed single-triangle GLB for any input image
#[derive(Debug, Clone, Default)]
pub struct MockConverter;

impl MockConverter {
    pub fn new() -> Self {
        Self
    }
}

impl MeshConverter for MockConverter {
    fn name(&self) -> &str {
        "mock"
    }

    fn health_check(&self) -> Result<ProviderStatus> {
        Ok(ProviderStatus::Available)
    }

    fn convert(&self, image_png: &[u8], _params: &ConversionParams) -> Result<Vec<u8>> {
        if image_png.is_empty() {
            return Err(SculptError::ConversionFailed(
                "Mock converter received an empty image".to_string(),
            ));
        }
        generate_minimal_glb()
    }
}

/// White canvas with a centered square tinted by the prompt text
fn render_object_on_white(prompt: &str, size: u32) -> DynamicImage {
    // A stable color from the prompt hash for visual interest
    let hash_val = prompt
        .bytes()
        .fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u32));
    let color = Rgb([
        ((hash_val >> 16) & 0x7F) as u8,
        ((hash_val >> 8) & 0x7F) as u8,
        (hash_val & 0x7F) as u8,
    ]);

    let mut img = RgbImage::from_pixel(size, size, Rgb([255, 255, 255]));
    let (lo, hi) = (size * 3 / 8, size * 5 / 8);
    for y in lo..hi {
        for x in lo..hi {
            img.put_pixel(x, y, color);
        }
    }
    DynamicImage::ImageRgb8(img)
}

/// Build a minimal valid GLB (single triangle)
pub fn generate_minimal_glb() -> Result<Vec<u8>> {
    let json = serde_json::json!({
        "asset": { "version": "2.0", "generator": "sculpt-mock" },
        "scene": 0,
        "scenes": [{ "nodes": [0] }],
        "nodes": [{ "mesh": 0 }],
        "meshes": [{
            "primitives": [{
                "attributes": { "POSITION": 0 },
                "indices": 1
            }]
        }],
        "accessors": [
            {
                "bufferView": 0,
                "componentType": 5126,
                "count": 3,
                "type": "VEC3",
                "max": [1.0, 1.0, 0.0],
                "min": [-1.0, 0.0, 0.0]
            },
            {
                "bufferView": 1,
                "componentType": 5123,
                "count": 3,
                "type": "SCALAR",
                "max": [2],
                "min": [0]
            }
        ],
        "bufferViews": [
            { "buffer": 0, "byteOffset": 0, "byteLength": 36, "target": 34962 },
            { "buffer": 0, "byteOffset": 36, "byteLength": 6, "target": 34963 }
        ],
        "buffers": [{ "byteLength": 44 }]
    });

    let json_str = serde_json::to_string(&json).map_err(|e| {
        SculptError::ConversionFailed(format!("Failed to serialize GLB JSON: {}", e))
    })?;

    // JSON chunk is space-padded to 4-byte alignment
    let mut json_chunk = json_str.into_bytes();
    json_chunk.resize((json_chunk.len() + 3) & !3, b' ');

    let vertices: [f32; 9] = [
        -1.0, 0.0, 0.0, // v0
        1.0, 0.0, 0.0, // v1
        0.0, 1.0, 0.0, // v2
    ];
    let indices: [u16; 3] = [0, 1, 2];

    let mut bin_chunk = Vec::with_capacity(44);
    for v in &vertices {
        bin_chunk.extend_from_slice(&v.to_le_bytes());
    }
    for i in &indices {
        bin_chunk.extend_from_slice(&i.to_le_bytes());
    }
    bin_chunk.resize((bin_chunk.len() + 3) & !3, 0);

    let total_len = 12 + 8 + json_chunk.len() + 8 + bin_chunk.len();
    let mut glb = Vec::with_capacity(total_len);

    // Header
    glb.extend_from_slice(b"glTF");
    glb.extend_from_slice(&2u32.to_le_bytes());
    glb.extend_from_slice(&(total_len as u32).to_le_bytes());

    glb.extend_from_slice(&(json_chunk.len() as u32).to_le_bytes());
    glb.extend_from_slice(&0x4E4F534Au32.to_le_bytes()); // "JSON"
    glb.extend_from_slice(&json_chunk);

    glb.extend_from_slice(&(bin_chunk.len() as u32).to_le_bytes());
    glb.extend_from_slice(&0x004E4942u32.to_le_bytes()); // "BIN\0"
    glb.extend_from_slice(&bin_chunk);

    Ok(glb)
}
