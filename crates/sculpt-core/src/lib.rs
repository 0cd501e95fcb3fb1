//! Sculpt Core - Foundational types for the Sculpt relay
//!
//! This crate provides the types that the other Sculpt crates depend on:
//! - `ContentHash` - SHA-256 digest of stored models
//! - Error types and Result alias

mod error;
mod hash;

pub use error::{Result, SculptError};
pub use hash::ContentHash;
