//! Daily report generation and artifact lifecycle.

pub mod prices;
pub mod renderer;

use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use tracing::info;

use crate::report::prices::QuoteClient;
use crate::report::renderer::ReportRenderer;

/// Builds the end-of-day report artifact: one quote line per tracked
/// symbol, rendered by the configured renderer into a per-date file.
pub struct ReportGenerator {
    quotes: QuoteClient,
    renderer: Box<dyn ReportRenderer>,
    artifact_dir: PathBuf,
}

impl ReportGenerator {
    pub fn new(
        quotes: QuoteClient,
        renderer: Box<dyn ReportRenderer>,
        artifact_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            quotes,
            renderer,
            artifact_dir: artifact_dir.into(),
        }
    }

    /// Generate the artifact for `date`. Symbols are looked up in order;
    /// each lookup is individually bounded, so one slow symbol cannot
    /// stall the report.
    pub async fn generate(&self, date: NaiveDate, symbols: &[String]) -> Result<PathBuf> {
        let mut lines = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            lines.push(self.quotes.quote_line(symbol).await);
        }

        let path = self.renderer.render(date, &lines)?;
        info!(date = %date, symbols = symbols.len(), path = %path.display(), "Report artifact generated");
        Ok(path)
    }

    /// Remove delivered artifacts.
    pub fn clear_artifacts(&self) -> Result<()> {
        renderer::clear_artifacts(&self.artifact_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::renderer::MarkdownRenderer;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_generate_writes_lines_for_all_symbols() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/quote"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "c": 50.0, "dp": 0.0, "h": 51.0, "l": 49.0
            })))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let generator = ReportGenerator::new(
            QuoteClient::new(&server.uri(), None, Duration::from_secs(5)),
            Box::new(MarkdownRenderer::new(dir.path())),
            dir.path(),
        );

        let date = NaiveDate::from_ymd_opt(2026, 8, 4).unwrap();
        let artifact = generator
            .generate(date, &["AAPL".to_string(), "MSFT".to_string()])
            .await
            .unwrap();

        let contents = std::fs::read_to_string(&artifact).unwrap();
        assert!(contents.contains("AAPL"));
        assert!(contents.contains("MSFT"));

        generator.clear_artifacts().unwrap();
        assert!(!artifact.exists());
    }

    #[tokio::test]
    async fn test_timed_out_symbol_gets_sentinel_and_report_proceeds() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/quote"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"c": 1.0}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let generator = ReportGenerator::new(
            QuoteClient::new(&server.uri(), None, Duration::from_millis(200)),
            Box::new(MarkdownRenderer::new(dir.path())),
            dir.path(),
        );

        let date = NaiveDate::from_ymd_opt(2026, 8, 4).unwrap();
        let artifact = generator
            .generate(date, &["SLOW".to_string()])
            .await
            .unwrap();

        let contents = std::fs::read_to_string(&artifact).unwrap();
        assert!(contents.contains("SLOW: quote timed out"));
    }
}
