//! Operator-channel notifier.
//!
//! Posts agent lifecycle events and job outcomes to a Discord webhook so
//! an operator can follow the agent without reading logs. Delivery
//! failures are logged and swallowed; this channel must never take the
//! agent down.

use chrono::NaiveDate;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::warn;

pub struct OpsNotifier {
    webhook_url: Option<SecretString>,
    http: reqwest::Client,
    enabled: bool,
}

/// Discord webhook message format.
#[derive(Debug, Serialize)]
struct WebhookMessage {
    content: String,
    username: String,
}

impl OpsNotifier {
    pub fn new(webhook_url: Option<SecretString>, enabled: bool) -> Self {
        Self {
            enabled: enabled && webhook_url.is_some(),
            webhook_url,
            http: reqwest::Client::new(),
        }
    }

    /// A notifier that drops everything. Used when no webhook is
    /// configured and in tests.
    pub fn disabled() -> Self {
        Self::new(None, false)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    async fn send(&self, message: &str) {
        if !self.enabled {
            return;
        }

        let Some(ref url) = self.webhook_url else {
            return;
        };

        let payload = WebhookMessage {
            content: message.to_string(),
            username: "newsdesk".to_string(),
        };

        match self.http.post(url.expose_secret()).json(&payload).send().await {
            Ok(response) => {
                if !response.status().is_success() {
                    warn!(
                        status = %response.status(),
                        "Ops webhook returned non-success status"
                    );
                }
            }
            Err(e) => {
                warn!(error = %e, "Failed to send ops notification");
            }
        }
    }

    /// Event: agent started.
    pub async fn startup(&self, tracked_symbols: usize) {
        let msg = format!(
            "✅ **newsdesk started** — tracking {tracked_symbols} symbol(s)"
        );
        self.send(&msg).await;
    }

    /// Event: sweep finished with fresh headlines delivered.
    pub async fn sweep_complete(&self, symbols: usize, symbols_with_news: usize) {
        let msg = format!(
            "📰 Sweep complete: {symbols_with_news}/{symbols} symbol(s) had fresh headlines"
        );
        self.send(&msg).await;
    }

    /// Event: digest delivered.
    pub async fn digest_complete(&self, symbols: usize) {
        let msg = format!("🗞️ Digest delivered for {symbols} symbol(s)");
        self.send(&msg).await;
    }

    /// Event: daily report delivered and dedup state reset.
    pub async fn report_delivered(&self, date: NaiveDate) {
        let msg = format!("📊 Daily report for {date} delivered — dedup store reset");
        self.send(&msg).await;
    }

    /// Event: a news provider failed for one symbol.
    pub async fn provider_failure(&self, provider: &str, symbol: &str, error: &str) {
        let msg = format!("❌ Provider `{provider}` failed for `{symbol}`: {error}");
        self.send(&msg).await;
    }

    /// Event: a scheduled job failed as a whole.
    pub async fn job_failure(&self, job: &str, error: &str) {
        let msg = format!("⚠️ Scheduled job `{job}` failed: {error}");
        self.send(&msg).await;
    }
}
