//! On-disk storage for generated models

use crate::convert::ModelAsset;
use sculpt_core::{Result, SculptError};
use std::fs;
use std::path::{Path, PathBuf};

const MAX_NAME_CHARS: usize = 30;
const FALLBACK_NAME: &str = "model";

/// Directory of `.glb` files named after the request that produced them
#[derive(Debug, Clone)]
pub struct ModelStore {
    root: PathBuf,
}

impl ModelStore {
    /// Create a store at the given directory (created on first save)
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path a model named `name` would be saved to
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.glb", safe_file_name(name)))
    }

    /// Write `bytes` under a name derived from `name`, replacing any previous file
    pub fn save(&self, name: &str, bytes: &[u8]) -> Result<PathBuf> {
        fs::create_dir_all(&self.root)?;
        let path = self.path_for(name);
        fs::write(&path, bytes)?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "model saved");
        Ok(path)
    }

    pub fn load(&self, path: &Path) -> Result<Vec<u8>> {
        Ok(fs::read(path)?)
    }

    /// Save the model, read it back, and return it with its stored path.
    ///
    /// Names that sanitise to the same file overwrite each other; the read-back
    /// is compared by content hash so a model replaced in between is an error
    /// rather than someone else's bytes.
    pub fn persist(&self, name: &str, model: ModelAsset) -> Result<ModelAsset> {
        let path = self.save(name, &model.bytes)?;
        let bytes = self.load(&path)?;
        verify_stored(path, &model, bytes)
    }

    /// List stored `.glb` files
    pub fn list(&self) -> Result<Vec<PathBuf>> {
        let mut models = Vec::new();
        if !self.root.exists() {
            return Ok(models);
        }
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some("glb") {
                models.push(path);
            }
        }
        models.sort();
        Ok(models)
    }
}

fn verify_stored(path: PathBuf, expected: &ModelAsset, bytes: Vec<u8>) -> Result<ModelAsset> {
    let mut stored = ModelAsset::new(bytes);
    if stored.content_hash != expected.content_hash {
        return Err(SculptError::IoError(std::io::Error::other(format!(
            "Stored model {} changed before it was read back ({} != {})",
            path.display(),
            stored.content_hash,
            expected.content_hash
        ))));
    }
    stored.path = Some(path);
    Ok(stored)
}

/// Keep alphanumerics, spaces, `-` and `_`, truncated to 30 characters.
/// Falls back to `model` when nothing is left.
pub fn safe_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .take(MAX_NAME_CHARS)
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        cleaned.to_string()
    }
}
