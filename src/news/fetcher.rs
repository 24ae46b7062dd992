//! Multi-provider fetch pipeline: validate, same-day filter, dedup,
//! persist, format.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::warn;

use crate::monitoring::ops::OpsNotifier;
use crate::news::{NewsItem, NewsProvider, RawArticle};
use crate::store::seen::{fingerprint, SeenStore};

pub struct NewsFetcher {
    providers: Vec<Box<dyn NewsProvider>>,
    seen: SeenStore,
    ops: Arc<OpsNotifier>,
}

impl NewsFetcher {
    pub fn new(
        providers: Vec<Box<dyn NewsProvider>>,
        seen: SeenStore,
        ops: Arc<OpsNotifier>,
    ) -> Self {
        Self {
            providers,
            seen,
            ops,
        }
    }

    /// Fetch not-yet-delivered headlines for one symbol, published on
    /// `as_of`, rendered as one-line strings.
    ///
    /// Providers are queried in declared order; a failing provider is
    /// reported and skipped, never fatal. New fingerprints are persisted
    /// before returning, so a crash mid-sweep loses at most the
    /// in-progress symbol's marks.
    pub async fn fetch_symbol_news(&self, symbol: &str, as_of: NaiveDate) -> Vec<String> {
        let mut seen = self.seen.load();
        let mut fresh: Vec<NewsItem> = Vec::new();

        for provider in &self.providers {
            let articles = match provider.fetch(symbol, as_of).await {
                Ok(articles) => articles,
                Err(e) => {
                    warn!(
                        provider = provider.name(),
                        symbol,
                        error = %e,
                        "News provider fetch failed — continuing with remaining providers"
                    );
                    self.ops
                        .provider_failure(provider.name(), symbol, &e.to_string())
                        .await;
                    continue;
                }
            };

            for raw in articles {
                let Some(item) = validate(raw, provider.icon()) else {
                    continue;
                };
                // Same-day news only
                if item.published_at.date_naive() != as_of {
                    continue;
                }
                let fp = fingerprint(&item.title, &item.url);
                if seen.contains_key(&fp) {
                    continue;
                }
                seen.insert(fp, true);
                fresh.push(item);
            }
        }

        if !fresh.is_empty() {
            if let Err(e) = self.seen.save(&seen) {
                warn!(symbol, error = %e, "Failed to persist seen fingerprints");
            }
        }

        fresh.iter().map(NewsItem::render).collect()
    }
}

/// Require a non-empty title, a non-empty link, and a parseable
/// publication date.
fn validate(raw: RawArticle, icon: &'static str) -> Option<NewsItem> {
    let title = raw.title.trim();
    let url = raw.url.trim();
    if title.is_empty() || url.is_empty() {
        return None;
    }
    let published_at = raw.published_at?;

    Some(NewsItem {
        title: title.to_string(),
        url: url.to_string(),
        source: raw.source,
        published_at,
        icon,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};

    struct StubProvider {
        articles: Vec<RawArticle>,
    }

    #[async_trait]
    impl NewsProvider for StubProvider {
        async fn fetch(&self, _symbol: &str, _as_of: NaiveDate) -> Result<Vec<RawArticle>> {
            Ok(self.articles.clone())
        }

        fn name(&self) -> &'static str {
            "stub"
        }

        fn icon(&self) -> &'static str {
            "📰"
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl NewsProvider for FailingProvider {
        async fn fetch(&self, _symbol: &str, _as_of: NaiveDate) -> Result<Vec<RawArticle>> {
            anyhow::bail!("connection refused")
        }

        fn name(&self) -> &'static str {
            "failing"
        }

        fn icon(&self) -> &'static str {
            "❌"
        }
    }

    fn article(title: &str, url: &str, hour: u32) -> RawArticle {
        RawArticle {
            title: title.to_string(),
            url: url.to_string(),
            source: "Wire".to_string(),
            published_at: Some(Utc.with_ymd_and_hms(2026, 8, 4, hour, 0, 0).unwrap()),
        }
    }

    fn fetcher_with(providers: Vec<Box<dyn NewsProvider>>) -> (tempfile::TempDir, NewsFetcher) {
        let dir = tempfile::tempdir().unwrap();
        let seen = SeenStore::new(dir.path().join("seen.json"));
        let fetcher = NewsFetcher::new(providers, seen, Arc::new(OpsNotifier::disabled()));
        (dir, fetcher)
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 4).unwrap()
    }

    #[tokio::test]
    async fn test_fresh_item_returned_once() {
        let (_dir, fetcher) = fetcher_with(vec![Box::new(StubProvider {
            articles: vec![article("X", "https://example.com/u", 9)],
        })]);

        let first = fetcher.fetch_symbol_news("AAPL", today()).await;
        assert_eq!(first.len(), 1);
        assert_eq!(first[0], "📰 [X](https://example.com/u) (Wire)");

        let second = fetcher.fetch_symbol_news("AAPL", today()).await;
        assert!(second.is_empty());
    }

    #[tokio::test]
    async fn test_stale_article_discarded() {
        let yesterday = RawArticle {
            published_at: Some(Utc.with_ymd_and_hms(2026, 8, 3, 9, 0, 0).unwrap()),
            ..article("Old", "https://example.com/old", 9)
        };
        let (_dir, fetcher) = fetcher_with(vec![Box::new(StubProvider {
            articles: vec![yesterday],
        })]);

        assert!(fetcher.fetch_symbol_news("AAPL", today()).await.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_articles_discarded() {
        let missing_title = article("", "https://example.com/a", 9);
        let missing_url = article("No link", "", 9);
        let missing_date = RawArticle {
            published_at: None,
            ..article("No date", "https://example.com/b", 9)
        };
        let (_dir, fetcher) = fetcher_with(vec![Box::new(StubProvider {
            articles: vec![missing_title, missing_url, missing_date],
        })]);

        assert!(fetcher.fetch_symbol_news("AAPL", today()).await.is_empty());
    }

    #[tokio::test]
    async fn test_failing_provider_does_not_abort_others() {
        let (_dir, fetcher) = fetcher_with(vec![
            Box::new(FailingProvider),
            Box::new(StubProvider {
                articles: vec![article("Survivor", "https://example.com/s", 9)],
            }),
        ]);

        let items = fetcher.fetch_symbol_news("AAPL", today()).await;
        assert_eq!(items.len(), 1);
        assert!(items[0].contains("Survivor"));
    }

    #[tokio::test]
    async fn test_duplicate_across_providers_deduped() {
        // Two providers returning the same (title, url): one survivor
        let shared = article("Shared", "https://example.com/shared", 9);
        let (_dir, fetcher) = fetcher_with(vec![
            Box::new(StubProvider {
                articles: vec![shared.clone()],
            }),
            Box::new(StubProvider {
                articles: vec![shared],
            }),
        ]);

        let items = fetcher.fetch_symbol_news("AAPL", today()).await;
        assert_eq!(items.len(), 1);
    }
}
