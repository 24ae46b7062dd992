//! Reference-data lookup: symbol → type classification.
//!
//! Used only by the add/revalidate command path. Lookup failures degrade
//! to `Unknown`; classification must never block tracking a symbol.

use anyhow::{Context, Result};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::warn;

use crate::store::symbols::SymbolKind;

pub struct SymbolClassifier {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<SecretString>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    result: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    symbol: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

impl SymbolClassifier {
    pub fn new(base_url: &str, api_key: Option<SecretString>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    /// Classify a symbol, degrading to `Unknown` on any failure.
    pub async fn classify(&self, symbol: &str) -> SymbolKind {
        match self.lookup(symbol).await {
            Ok(kind) => kind,
            Err(e) => {
                warn!(symbol, error = %e, "Reference-data lookup failed — classifying as Unknown");
                SymbolKind::Unknown
            }
        }
    }

    async fn lookup(&self, symbol: &str) -> Result<SymbolKind> {
        let encoded = urlencoding::encode(symbol);
        let url = format!("{}/search?q={encoded}", self.base_url);

        let mut request = self.client.get(&url);
        if let Some(ref key) = self.api_key {
            request = request.header("X-Finnhub-Token", key.expose_secret());
        }

        let response = request.send().await.context("Symbol search failed")?;
        if !response.status().is_success() {
            anyhow::bail!("Symbol search returned {}", response.status());
        }

        let body: SearchResponse = response
            .json()
            .await
            .context("Failed to parse symbol search response")?;

        let kind = body
            .result
            .iter()
            .find(|r| r.symbol.as_deref() == Some(symbol))
            .and_then(|r| r.kind.as_deref())
            .map(map_type)
            .unwrap_or(SymbolKind::Unknown);

        Ok(kind)
    }
}

/// Map a vendor type string to our classification tag.
fn map_type(raw: &str) -> SymbolKind {
    let lowered = raw.to_lowercase();
    if lowered.contains("etf") || lowered.contains("etp") {
        SymbolKind::Etf
    } else if lowered.contains("stock") || lowered.contains("equity") {
        SymbolKind::Stock
    } else {
        SymbolKind::Unknown
    }
}
