//! Deduplication store: which headline fingerprints have already been
//! delivered. Grows until the daily report boundary resets it.

use std::collections::HashMap;
use std::path::PathBuf;

use sha2::{Digest, Sha256};

use super::{load_document, save_document, StoreError};

/// Hex chars kept from the digest. Collisions across distinct
/// (title, url) pairs are acceptable for a dedup key over public data.
const FINGERPRINT_LEN: usize = 16;

/// Deterministic digest of a headline's title and URL.
pub fn fingerprint(title: &str, url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(title.as_bytes());
    hasher.update(url.as_bytes());
    let digest = hasher.finalize();
    hex::encode(digest)[..FINGERPRINT_LEN].to_string()
}

/// Persisted fingerprint → seen mapping.
///
/// No in-memory mirror: every check reloads from disk, every update
/// rewrites the file. Once a fingerprint is marked seen it stays seen
/// until `reset()`.
#[derive(Debug, Clone)]
pub struct SeenStore {
    path: PathBuf,
}

impl SeenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the seen map, failing soft to empty when the backing file is
    /// absent or unreadable.
    pub fn load(&self) -> HashMap<String, bool> {
        load_document(&self.path)
    }

    pub fn save(&self, seen: &HashMap<String, bool>) -> Result<(), StoreError> {
        save_document(&self.path, seen)
    }

    /// Wipe all recorded fingerprints. Defines the day boundary: every
    /// previously seen headline becomes deliverable again.
    pub fn reset(&self) -> Result<(), StoreError> {
        self.save(&HashMap::new())
    }
}
