//! Messaging gateway abstraction.
//!
//! The agent never talks to a chat wire protocol directly; it needs
//! exactly these operations plus periodic timers.

pub mod discord;

use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait MessagingGateway: Send + Sync {
    /// Post a text message to a channel.
    async fn send(&self, channel_id: &str, text: &str) -> Result<()>;

    /// Post a text message with a file attached.
    async fn send_with_attachment(
        &self,
        channel_id: &str,
        text: &str,
        attachment: &Path,
    ) -> Result<()>;

    /// Delete non-pinned channel messages created before `cutoff`.
    async fn purge_older_than(&self, channel_id: &str, cutoff: DateTime<Utc>) -> Result<()>;

    /// Cheap reachability probe. Called once at startup; failure is
    /// fatal there.
    async fn ping(&self) -> Result<()>;
}
