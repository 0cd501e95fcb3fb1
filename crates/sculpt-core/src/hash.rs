//! Content hashing for stored models

use sha2::{Digest, Sha256};

/// A SHA-256 digest of a model's bytes.
///
/// Two requests that produce the same GLB report the same hash regardless of
/// the file name it was saved under.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    pub fn from_bytes(data: &[u8]) -> Self {
        Self(Sha256::digest(data).into())
    }

    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }

    /// Hex digest with the algorithm prefix, e.g. `sha256:ab12...`
    pub fn to_prefixed_hex(&self) -> String {
        format!("sha256:{}", self.to_hex())
    }
}
