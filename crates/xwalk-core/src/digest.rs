//! # Content Digests
//!
//! SHA-256 content addressing for requirement catalogs. A framework
//! version's requirement set is digested at ingestion time; the digest
//! chains to the previous version's digest so a version lineage is
//! content-addressed end to end.
//!
//! `sha256_digest()` accepts only `&CanonicalBytes` — compile-time
//! enforcement that every digest path flows through canonicalization.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::canonical::CanonicalBytes;

/// A SHA-256 content digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentDigest([u8; 32]);

impl ContentDigest {
    /// Wrap raw digest bytes. Prefer [`sha256_digest()`].
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// The raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Render as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sha256:{}", self.to_hex())
    }
}

/// Compute a SHA-256 content digest from canonical bytes.
///
/// Accepts only `&CanonicalBytes`, not raw `&[u8]`, so no code path can
/// digest non-canonical bytes.
pub fn sha256_digest(data: &CanonicalBytes) -> ContentDigest {
    let hash = Sha256::digest(data.as_bytes());
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&hash);
    ContentDigest::from_bytes(bytes)
}

/// Compute a SHA-256 hex string from canonical bytes.
pub fn sha256_hex(data: &CanonicalBytes) -> String {
    sha256_digest(data).to_hex()
}

/// Incremental SHA-256 accumulator for composite digests.
///
/// Used when a digest covers a domain-separation prefix plus multiple
/// individually canonicalized components (e.g. catalog metadata followed
/// by each requirement in code order). Each component still goes through
/// `CanonicalBytes` before being fed to the accumulator; the accumulator
/// exists only to combine them under one prefix.
#[derive(Debug, Default)]
pub struct Sha256Accumulator {
    hasher: Sha256,
}

impl Sha256Accumulator {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes (domain prefixes) into the accumulator.
    pub fn update(&mut self, data: &[u8]) {
        self.hasher.update(data);
    }

    /// Feed canonical bytes into the accumulator.
    pub fn update_canonical(&mut self, data: &CanonicalBytes) {
        self.hasher.update(data.as_bytes());
    }

    /// Finalize and return the digest.
    pub fn finalize(self) -> ContentDigest {
        let hash = self.hasher.finalize();
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&hash);
        ContentDigest::from_bytes(bytes)
    }

    /// Finalize and return the digest as a hex string.
    pub fn finalize_hex(self) -> String {
        self.finalize().to_hex()
    }
}
