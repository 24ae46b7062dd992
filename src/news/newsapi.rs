//! NewsAPI.org provider.
//!
//! Queries the `everything` endpoint for one symbol, bounded to the
//! requested day.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use secrecy::SecretString;
use serde::Deserialize;

use crate::config::NewsConfig;
use crate::news::{http_client, secret_ref, NewsProvider, ProviderLimiter, RawArticle};

pub struct NewsApiProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: SecretString,
    language: String,
    page_size: u32,
    limiter: Arc<ProviderLimiter>,
}

impl NewsApiProvider {
    pub fn new(config: &NewsConfig, api_key: SecretString, limiter: Arc<ProviderLimiter>) -> Self {
        Self {
            client: http_client(),
            base_url: config.newsapi_base_url.trim_end_matches('/').to_string(),
            api_key,
            language: config.language.clone(),
            page_size: config.page_size,
            limiter,
        }
    }
}

#[async_trait]
impl NewsProvider for NewsApiProvider {
    async fn fetch(&self, symbol: &str, as_of: NaiveDate) -> Result<Vec<RawArticle>> {
        self.limiter.until_ready().await;

        let day = as_of.format("%Y-%m-%d").to_string();
        let url = format!("{}/everything", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", symbol.to_string()),
                ("from", day.clone()),
                ("to", day),
                ("language", self.language.clone()),
                ("sortBy", "publishedAt".to_string()),
                ("pageSize", self.page_size.to_string()),
            ])
            .header("X-Api-Key", secret_ref(&self.api_key))
            .send()
            .await
            .context("NewsAPI request failed")?;

        if !response.status().is_success() {
            anyhow::bail!("NewsAPI returned {}", response.status());
        }

        let body: NewsApiResponse = response
            .json()
            .await
            .context("Failed to parse NewsAPI response")?;

        Ok(body
            .articles
            .into_iter()
            .map(|a| RawArticle {
                title: a.title.unwrap_or_default(),
                url: a.url.unwrap_or_default(),
                source: a
                    .source
                    .and_then(|s| s.name)
                    .unwrap_or_else(|| "NewsAPI".to_string()),
                published_at: a
                    .published_at
                    .as_deref()
                    .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                    .map(|dt| dt.with_timezone(&Utc)),
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "newsapi"
    }

    fn icon(&self) -> &'static str {
        "📰"
    }
}

#[derive(Debug, Deserialize)]
struct NewsApiResponse {
    #[serde(default)]
    articles: Vec<NewsApiArticle>,
}

/// `Option` liberally: the API omits or nulls fields on syndicated items.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewsApiArticle {
    source: Option<NewsApiSource>,
    title: Option<String>,
    url: Option<String>,
    published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NewsApiSource {
    name: Option<String>,
}
