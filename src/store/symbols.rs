//! Tracked-symbol store: durable symbol → classification mapping.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::{load_document, save_document, StoreError};

/// Classification tag from the reference-data lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SymbolKind {
    Stock,
    #[serde(rename = "ETF")]
    Etf,
    Unknown,
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolKind::Stock => write!(f, "Stock"),
            SymbolKind::Etf => write!(f, "ETF"),
            SymbolKind::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Uppercase-normalize a user-supplied ticker.
pub fn normalize(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

/// Persisted tracked-symbol list. BTreeMap keeps sweep order stable
/// across runs. Mutated only by explicit add/remove/revalidate.
#[derive(Debug, Clone)]
pub struct SymbolStore {
    path: PathBuf,
}

impl SymbolStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load all tracked symbols, failing soft to empty.
    pub fn load(&self) -> BTreeMap<String, SymbolKind> {
        load_document(&self.path)
    }

    pub fn save(&self, symbols: &BTreeMap<String, SymbolKind>) -> Result<(), StoreError> {
        save_document(&self.path, symbols)
    }

    /// Track a symbol. Returns false when it was already tracked (the
    /// stored classification is left untouched).
    pub fn add(&self, symbol: &str, kind: SymbolKind) -> Result<bool, StoreError> {
        let symbol = normalize(symbol);
        let mut symbols = self.load();
        if symbols.contains_key(&symbol) {
            return Ok(false);
        }
        symbols.insert(symbol, kind);
        self.save(&symbols)?;
        Ok(true)
    }

    /// Stop tracking a symbol. Returns false when it was not tracked.
    pub fn remove(&self, symbol: &str) -> Result<bool, StoreError> {
        let symbol = normalize(symbol);
        let mut symbols = self.load();
        if symbols.remove(&symbol).is_none() {
            return Ok(false);
        }
        self.save(&symbols)?;
        Ok(true)
    }

    /// Overwrite a tracked symbol's classification, e.g. after a
    /// revalidation lookup. Returns false when the symbol is not tracked.
    pub fn reclassify(&self, symbol: &str, kind: SymbolKind) -> Result<bool, StoreError> {
        let symbol = normalize(symbol);
        let mut symbols = self.load();
        match symbols.get_mut(&symbol) {
            Some(entry) => *entry = kind,
            None => return Ok(false),
        }
        self.save(&symbols)?;
        Ok(true)
    }
}
