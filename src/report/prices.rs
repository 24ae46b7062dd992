//! Quote lookups for the daily report.
//!
//! Every lookup is wrapped in a bounded timeout; a slow or failing quote
//! source degrades to a sentinel line for that symbol and never stalls
//! the report.

use std::time::Duration;

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::warn;

pub struct QuoteClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<SecretString>,
    timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct Quote {
    pub current: Decimal,
    pub change_pct: Decimal,
    pub high: Decimal,
    pub low: Decimal,
}

/// Finnhub quote shape: c = current, dp = percent change, h/l = day range.
#[derive(Debug, Deserialize)]
struct QuoteResponse {
    c: Option<Decimal>,
    dp: Option<Decimal>,
    h: Option<Decimal>,
    l: Option<Decimal>,
}

impl QuoteClient {
    pub fn new(base_url: &str, api_key: Option<SecretString>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            timeout,
        }
    }

    async fn fetch_quote(&self, symbol: &str) -> Result<Quote> {
        let url = format!("{}/quote", self.base_url);
        let mut request = self.client.get(&url).query(&[("symbol", symbol)]);
        if let Some(ref key) = self.api_key {
            request = request.header("X-Finnhub-Token", key.expose_secret());
        }

        let response = request.send().await.context("Quote request failed")?;
        if !response.status().is_success() {
            anyhow::bail!("Quote source returned {}", response.status());
        }

        let body: QuoteResponse = response
            .json()
            .await
            .context("Failed to parse quote response")?;

        let current = body.c.context("Quote response missing current price")?;
        Ok(Quote {
            current,
            change_pct: body.dp.unwrap_or(Decimal::ZERO),
            high: body.h.unwrap_or(current),
            low: body.l.unwrap_or(current),
        })
    }

    /// One report line per symbol. Timeout and errors become sentinel
    /// lines; this never fails.
    pub async fn quote_line(&self, symbol: &str) -> String {
        match tokio::time::timeout(self.timeout, self.fetch_quote(symbol)).await {
            Ok(Ok(quote)) => format!(
                "{symbol}: {} ({}%) — day range {}–{}",
                quote.current.round_dp(2),
                quote.change_pct.round_dp(2),
                quote.low.round_dp(2),
                quote.high.round_dp(2),
            ),
            Ok(Err(e)) => {
                warn!(symbol, error = %e, "Quote lookup failed");
                format!("{symbol}: quote unavailable")
            }
            Err(_) => {
                warn!(symbol, timeout_s = self.timeout.as_secs(), "Quote lookup timed out");
                format!("{symbol}: quote timed out")
            }
        }
    }
}
