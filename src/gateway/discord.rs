//! Discord REST implementation of the messaging gateway.

use std::future::Future;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::gateway::MessagingGateway;

const MAX_RETRIES: u32 = 3;
const BACKOFF_BASE_MS: u64 = 250;
const BACKOFF_MAX_MS: u64 = 2_000;

/// Messages fetched per purge page; Discord's API maximum.
const PURGE_PAGE_SIZE: u32 = 100;

pub struct DiscordGateway {
    http: reqwest::Client,
    base_url: String,
    token: SecretString,
}

#[derive(Debug, Serialize)]
struct CreateMessage<'a> {
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChannelMessage {
    id: String,
    pinned: bool,
    timestamp: String,
}

impl DiscordGateway {
    pub fn new(base_url: &str, token: SecretString) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn auth_header(&self) -> String {
        format!("Bot {}", self.token.expose_secret())
    }

    /// Retry a transient-failure-prone call with exponential backoff.
    async fn with_retry<T, F, Fut>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    if attempt > MAX_RETRIES {
                        return Err(e.context(format!("Failed after {MAX_RETRIES} retries")));
                    }

                    let backoff_ms = std::cmp::min(
                        BACKOFF_BASE_MS.saturating_mul(2u64.pow(attempt - 1)),
                        BACKOFF_MAX_MS,
                    );

                    warn!(
                        attempt,
                        backoff_ms,
                        error = %e,
                        "Retrying gateway call after transient failure"
                    );

                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                }
            }
        }
    }

    async fn fetch_messages(&self, channel_id: &str) -> Result<Vec<ChannelMessage>> {
        let url = format!("{}/channels/{channel_id}/messages", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("limit", PURGE_PAGE_SIZE.to_string())])
            .header("Authorization", self.auth_header())
            .send()
            .await
            .context("Failed to fetch channel messages")?;

        if !response.status().is_success() {
            anyhow::bail!("Message fetch returned {}", response.status());
        }

        response
            .json()
            .await
            .context("Failed to parse channel messages")
    }

    async fn delete_message(&self, channel_id: &str, message_id: &str) -> Result<()> {
        let url = format!(
            "{}/channels/{channel_id}/messages/{message_id}",
            self.base_url
        );
        let response = self
            .http
            .delete(&url)
            .header("Authorization", self.auth_header())
            .send()
            .await
            .context("Failed to delete message")?;

        if !response.status().is_success() {
            anyhow::bail!("Message delete returned {}", response.status());
        }

        Ok(())
    }
}

#[async_trait]
impl MessagingGateway for DiscordGateway {
    async fn send(&self, channel_id: &str, text: &str) -> Result<()> {
        let url = format!("{}/channels/{channel_id}/messages", self.base_url);

        self.with_retry(|| {
            let url = url.clone();
            async move {
                let response = self
                    .http
                    .post(&url)
                    .header("Authorization", self.auth_header())
                    .json(&CreateMessage { content: text })
                    .send()
                    .await
                    .context("Failed to send message")?;

                if !response.status().is_success() {
                    anyhow::bail!("Message send returned {}", response.status());
                }
                Ok(())
            }
        })
        .await
    }

    async fn send_with_attachment(
        &self,
        channel_id: &str,
        text: &str,
        attachment: &Path,
    ) -> Result<()> {
        let url = format!("{}/channels/{channel_id}/messages", self.base_url);
        let file_name = attachment
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "attachment".to_string());
        let bytes = tokio::fs::read(attachment)
            .await
            .with_context(|| format!("Failed to read attachment {}", attachment.display()))?;

        self.with_retry(|| {
            let url = url.clone();
            let file_name = file_name.clone();
            let bytes = bytes.clone();
            async move {
                let payload = serde_json::json!({ "content": text }).to_string();
                let form = reqwest::multipart::Form::new()
                    .text("payload_json", payload)
                    .part(
                        "files[0]",
                        reqwest::multipart::Part::bytes(bytes).file_name(file_name),
                    );

                let response = self
                    .http
                    .post(&url)
                    .header("Authorization", self.auth_header())
                    .multipart(form)
                    .send()
                    .await
                    .context("Failed to send attachment")?;

                if !response.status().is_success() {
                    anyhow::bail!("Attachment send returned {}", response.status());
                }
                Ok(())
            }
        })
        .await
    }

    async fn purge_older_than(&self, channel_id: &str, cutoff: DateTime<Utc>) -> Result<()> {
        let messages = self.fetch_messages(channel_id).await?;

        let mut deleted = 0usize;
        for message in &messages {
            if message.pinned {
                continue;
            }
            let Ok(created) = DateTime::parse_from_rfc3339(&message.timestamp) else {
                continue;
            };
            if created.with_timezone(&Utc) >= cutoff {
                continue;
            }
            // One failed delete shouldn't stop the purge
            match self.delete_message(channel_id, &message.id).await {
                Ok(()) => deleted += 1,
                Err(e) => {
                    warn!(message_id = %message.id, error = %e, "Failed to delete message")
                }
            }
        }

        tracing::info!(channel_id, deleted, "Channel purge complete");
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        let url = format!("{}/users/@me", self.base_url);
        let response = self
            .http
            .get(&url)
            .header("Authorization", self.auth_header())
            .send()
            .await
            .context("Messaging gateway unreachable")?;

        if !response.status().is_success() {
            anyhow::bail!("Gateway authentication check returned {}", response.status());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn gateway(server: &MockServer) -> DiscordGateway {
        DiscordGateway::new(&server.uri(), SecretString::from("token".to_string())).unwrap()
    }

    #[tokio::test]
    async fn test_send_posts_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/channels/42/messages"))
            .and(body_partial_json(serde_json::json!({"content": "hello"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        gateway(&server).send("42", "hello").await.unwrap();
    }

    #[tokio::test]
    async fn test_ping_checks_auth() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/@me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "1", "username": "newsdesk"
            })))
            .mount(&server)
            .await;

        gateway(&server).ping().await.unwrap();
    }

    #[tokio::test]
    async fn test_ping_fails_on_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/@me"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        assert!(gateway(&server).ping().await.is_err());
    }

    #[tokio::test]
    async fn test_purge_deletes_old_unpinned_only() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/channels/42/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": "1", "pinned": false, "timestamp": "2026-08-01T10:00:00+00:00"},
                {"id": "2", "pinned": true,  "timestamp": "2026-08-01T10:00:00+00:00"},
                {"id": "3", "pinned": false, "timestamp": "2026-08-07T10:00:00+00:00"}
            ])))
            .mount(&server)
            .await;
        // Only message 1 is old and unpinned
        Mock::given(method("DELETE"))
            .and(path("/channels/42/messages/1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let cutoff = DateTime::parse_from_rfc3339("2026-08-05T00:00:00+00:00")
            .unwrap()
            .with_timezone(&Utc);
        gateway(&server).purge_older_than("42", cutoff).await.unwrap();
    }
}
