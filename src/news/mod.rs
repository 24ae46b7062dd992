//! News providers and the dedup-aware fetch pipeline.

pub mod fetcher;
pub mod finnhub;
pub mod newsapi;

use std::num::NonZeroU32;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use secrecy::SecretString;

use crate::config::{NewsConfig, RateLimitConfig, Secrets};

/// Direct rate limiter shared across all provider requests.
pub type ProviderLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

pub fn provider_limiter(config: &RateLimitConfig) -> Arc<ProviderLimiter> {
    let rps = NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::new(5).unwrap());
    let burst = NonZeroU32::new(config.burst_size).unwrap_or(NonZeroU32::new(10).unwrap());

    let quota = Quota::per_second(rps).allow_burst(burst);
    Arc::new(RateLimiter::direct(quota))
}

/// A provider article after normalization, before validation and dedup.
#[derive(Debug, Clone)]
pub struct RawArticle {
    pub title: String,
    pub url: String,
    pub source: String,
    /// None when the provider's publication date could not be parsed;
    /// such articles are discarded by the fetcher.
    pub published_at: Option<DateTime<Utc>>,
}

/// A headline that survived validation and dedup, ready for delivery.
#[derive(Debug, Clone)]
pub struct NewsItem {
    pub title: String,
    pub url: String,
    pub source: String,
    pub published_at: DateTime<Utc>,
    pub icon: &'static str,
}

impl NewsItem {
    /// One-line Markdown rendering used in channel messages.
    pub fn render(&self) -> String {
        format!(
            "{} [{}]({}) ({})",
            self.icon, self.title, self.url, self.source
        )
    }
}

/// A single news vendor. Implementations fetch and normalize; validation,
/// recency filtering, and dedup live in the fetcher so they stay
/// provider-agnostic.
#[async_trait]
pub trait NewsProvider: Send + Sync {
    /// Fetch raw articles for one symbol on one day. Network, HTTP, and
    /// parse failures come back as errors; the fetcher logs them and
    /// continues with the remaining providers.
    async fn fetch(&self, symbol: &str, as_of: NaiveDate) -> Result<Vec<RawArticle>>;

    fn name(&self) -> &'static str;

    /// Icon prefixed to this provider's rendered headlines.
    fn icon(&self) -> &'static str;
}

/// Build the enabled providers. A provider that is enabled but missing
/// its API key is skipped with a warning rather than failing startup.
pub fn build_providers(
    news: &NewsConfig,
    rate_limit: &RateLimitConfig,
    secrets: &Secrets,
) -> Vec<Box<dyn NewsProvider>> {
    let limiter = provider_limiter(rate_limit);
    let mut providers: Vec<Box<dyn NewsProvider>> = Vec::new();

    match (news.newsapi_enabled, &secrets.newsapi_api_key) {
        (true, Some(key)) => providers.push(Box::new(newsapi::NewsApiProvider::new(
            news,
            key.clone(),
            limiter.clone(),
        ))),
        (true, None) => {
            tracing::warn!("NEWSAPI_API_KEY not set — NewsAPI provider disabled")
        }
        (false, _) => {}
    }

    match (news.finnhub_enabled, &secrets.finnhub_api_key) {
        (true, Some(key)) => providers.push(Box::new(finnhub::FinnhubProvider::new(
            news,
            key.clone(),
            limiter.clone(),
        ))),
        (true, None) => {
            tracing::warn!("FINNHUB_API_KEY not set — Finnhub provider disabled")
        }
        (false, _) => {}
    }

    if providers.is_empty() {
        tracing::warn!("No news providers configured — fetches will return nothing");
    }

    providers
}

pub(crate) fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .build()
        .expect("Failed to build HTTP client")
}

pub(crate) fn secret_ref(key: &SecretString) -> &str {
    use secrecy::ExposeSecret;
    key.expose_secret()
}
