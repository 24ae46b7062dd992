//! Finnhub company-news provider.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use secrecy::SecretString;
use serde::Deserialize;

use crate::config::NewsConfig;
use crate::news::{http_client, secret_ref, NewsProvider, ProviderLimiter, RawArticle};

pub struct FinnhubProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: SecretString,
    limiter: Arc<ProviderLimiter>,
}

impl FinnhubProvider {
    pub fn new(config: &NewsConfig, api_key: SecretString, limiter: Arc<ProviderLimiter>) -> Self {
        Self {
            client: http_client(),
            base_url: config.finnhub_base_url.trim_end_matches('/').to_string(),
            api_key,
            limiter,
        }
    }
}

#[async_trait]
impl NewsProvider for FinnhubProvider {
    async fn fetch(&self, symbol: &str, as_of: NaiveDate) -> Result<Vec<RawArticle>> {
        self.limiter.until_ready().await;

        let day = as_of.format("%Y-%m-%d").to_string();
        let url = format!("{}/company-news", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("symbol", symbol.to_string()),
                ("from", day.clone()),
                ("to", day),
            ])
            .header("X-Finnhub-Token", secret_ref(&self.api_key))
            .send()
            .await
            .context("Finnhub request failed")?;

        if !response.status().is_success() {
            anyhow::bail!("Finnhub returned {}", response.status());
        }

        let body: Vec<FinnhubArticle> = response
            .json()
            .await
            .context("Failed to parse Finnhub response")?;

        Ok(body
            .into_iter()
            .map(|a| RawArticle {
                title: a.headline.unwrap_or_default(),
                url: a.url.unwrap_or_default(),
                source: a.source.unwrap_or_else(|| "Finnhub".to_string()),
                published_at: a
                    .datetime
                    .and_then(|secs| DateTime::from_timestamp(secs, 0)),
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "finnhub"
    }

    fn icon(&self) -> &'static str {
        "🗞️"
    }
}

/// Company-news record; `datetime` is unix seconds.
#[derive(Debug, Deserialize)]
struct FinnhubArticle {
    headline: Option<String>,
    url: Option<String>,
    source: Option<String>,
    datetime: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RateLimitConfig;
    use crate::news::provider_limiter;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base_url: String) -> NewsConfig {
        NewsConfig {
            newsapi_enabled: false,
            finnhub_enabled: true,
            page_size: 10,
            language: "en".to_string(),
            newsapi_base_url: String::new(),
            finnhub_base_url: base_url,
        }
    }

    fn test_provider(server: &MockServer) -> FinnhubProvider {
        FinnhubProvider::new(
            &test_config(server.uri()),
            SecretString::from("test-key".to_string()),
            provider_limiter(&RateLimitConfig {
                requests_per_second: 100,
                burst_size: 100,
            }),
        )
    }

    #[tokio::test]
    async fn test_fetch_parses_company_news() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/company-news"))
            .and(query_param("symbol", "MSFT"))
            .and(query_param("from", "2026-08-04"))
            .and(query_param("to", "2026-08-04"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {
                    "category": "company",
                    "datetime": 1_786_172_400i64,
                    "headline": "Microsoft announces dividend",
                    "id": 1,
                    "source": "Reuters",
                    "url": "https://example.com/m"
                }
            ])))
            .mount(&server)
            .await;

        let provider = test_provider(&server);
        let as_of = NaiveDate::from_ymd_opt(2026, 8, 4).unwrap();
        let articles = provider.fetch("MSFT", as_of).await.unwrap();
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title, "Microsoft announces dividend");
        assert_eq!(articles[0].source, "Reuters");
    }

    #[tokio::test]
    async fn test_malformed_body_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/company-news"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let provider = test_provider(&server);
        let as_of = NaiveDate::from_ymd_opt(2026, 8, 4).unwrap();
        assert!(provider.fetch("MSFT", as_of).await.is_err());
    }

    #[tokio::test]
    async fn test_missing_datetime_becomes_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/company-news"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"headline": "No date", "url": "https://example.com/x", "source": "Wire"}
            ])))
            .mount(&server)
            .await;

        let provider = test_provider(&server);
        let as_of = NaiveDate::from_ymd_opt(2026, 8, 4).unwrap();
        let articles = provider.fetch("MSFT", as_of).await.unwrap();
        assert!(articles[0].published_at.is_none());
    }
}
