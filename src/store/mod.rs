//! Durable state: two flat JSON documents (tracked symbols and seen
//! fingerprints) plus shared atomic-write helpers.
//!
//! Single-writer by design. Every reader reloads from disk and every
//! writer rewrites the whole document; this is acceptable at this write
//! volume and keeps state crash-consistent. Running multiple instances
//! against the same files is unsupported.

pub mod seen;
pub mod symbols;

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to serialize state: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
}

/// Read a JSON document, treating a missing or unreadable file as empty
/// state.
pub(crate) fn load_document<T: DeserializeOwned + Default>(path: &Path) -> T {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(_) => return T::default(),
    };

    match serde_json::from_str(&contents) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "State file unreadable — starting from empty"
            );
            T::default()
        }
    }
}

/// Overwrite a JSON document atomically: write a sibling temp file, then
/// rename it over the target so a crash never leaves a torn file behind.
pub(crate) fn save_document<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(value)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| StoreError::Write {
                path: parent.display().to_string(),
                source,
            })?;
        }
    }

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).map_err(|source| StoreError::Write {
        path: tmp.display().to_string(),
        source,
    })?;
    fs::rename(&tmp, path).map_err(|source| StoreError::Write {
        path: path.display().to_string(),
        source,
    })?;

    Ok(())
}
