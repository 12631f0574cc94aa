//! Digest providers.

use crate::error::TokenError;
use sha2::{Digest, Sha256};

/// Hashes token ingredients. Injected into the engine at construction.
pub trait DigestProvider: Send + Sync {
    /// Lowercase hex digest of `data`.
    fn hex_digest(&self, data: &[u8]) -> Result<String, TokenError>;
}

/// SHA-256, the only production provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Digest;

impl DigestProvider for Sha256Digest {
    fn hex_digest(&self, data: &[u8]) -> Result<String, TokenError> {
        Ok(hex::encode(Sha256::digest(data)))
    }
}
