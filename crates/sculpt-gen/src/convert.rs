//! Image-to-3D conversion
//!
//! Conversion is a single upstream call. Unlike generation there is no retry:
//! any failure is reported as `SculptError::ConversionFailed`.

use crate::provider::{ConversionParams, MeshConverter};
use image::{DynamicImage, ImageFormat};
use sculpt_core::{ContentHash, Result, SculptError};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::path::PathBuf;

/// A GLB model returned by the converter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelAsset {
    #[serde(skip)]
    pub bytes: Vec<u8>,
    /// Where the model was written, once stored
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Content hash (sha256:...)
    pub content_hash: String,
}

impl ModelAsset {
    pub fn new(bytes: Vec<u8>) -> Self {
        let content_hash = ContentHash::from_bytes(&bytes).to_prefixed_hex();
        Self {
            bytes,
            path: None,
            content_hash,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// True when the bytes start with the binary glTF magic
    pub fn is_glb(&self) -> bool {
        self.bytes.starts_with(b"glTF")
    }
}

/// Encode an image as PNG
pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .map_err(|e| SculptError::ImageError(format!("Failed to encode PNG: {}", e)))?;
    Ok(buf)
}

/// PNG-encode `image` and submit it for conversion once
pub fn convert_to_3d(
    converter: &dyn MeshConverter,
    image: &DynamicImage,
    params: &ConversionParams,
) -> Result<ModelAsset> {
    let png = encode_png(image)?;
    convert_png(converter, &png, params)
}

/// Submit already-encoded PNG bytes for conversion once
pub fn convert_png(
    converter: &dyn MeshConverter,
    png: &[u8],
    params: &ConversionParams,
) -> Result<ModelAsset> {
    tracing::info!(
        provider = converter.name(),
        image_bytes = png.len(),
        foreground_ratio = params.foreground_ratio,
        texture_resolution = %params.texture_resolution,
        "converting image to 3D"
    );

    let bytes = converter.convert(png, params).map_err(|e| match e {
        SculptError::ConversionFailed(msg) => SculptError::ConversionFailed(msg),
        other => SculptError::ConversionFailed(other.to_string()),
    })?;

    if bytes.is_empty() {
        return Err(SculptError::ConversionFailed(format!(
            "{} returned an empty model",
            converter.name()
        )));
    }

    let model = ModelAsset::new(bytes);
    if !model.is_glb() {
        tracing::warn!(
            provider = converter.name(),
            "converter response does not start with glTF magic"
        );
    }
    tracing::info!(bytes = model.len(), hash = %model.content_hash, "conversion complete");
    Ok(model)
}
