use std::path::Path;

use anyhow::{Context, Result};
use chrono_tz::Tz;
use secrecy::SecretString;
use serde::Deserialize;

use crate::hours::TradingWindow;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub schedule: ScheduleConfig,
    pub market_hours: MarketHoursConfig,
    pub news: NewsConfig,
    pub messaging: MessagingConfig,
    pub report: ReportConfig,
    pub storage: StorageConfig,
    pub monitoring: MonitoringConfig,
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    pub sweep_interval_minutes: u64,
    pub digest_interval_hours: u64,
    pub report_hour: u32,
    pub timezone: String,
}

impl ScheduleConfig {
    /// Resolve the configured IANA timezone name. An unknown name is a
    /// configuration error and aborts startup.
    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| anyhow::anyhow!("Unknown timezone '{}': {e}", self.timezone))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarketHoursConfig {
    pub open_hour: u32,
    pub close_hour: u32,
}

impl MarketHoursConfig {
    pub fn window(&self) -> TradingWindow {
        TradingWindow {
            open_hour: self.open_hour,
            close_hour: self.close_hour,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewsConfig {
    pub newsapi_enabled: bool,
    pub finnhub_enabled: bool,
    pub page_size: u32,
    pub language: String,
    pub newsapi_base_url: String,
    pub finnhub_base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessagingConfig {
    pub channel_id: String,
    pub base_url: String,
    pub ops_enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    pub artifact_dir: String,
    pub quote_timeout_seconds: u64,
    pub quote_base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub symbols_path: String,
    pub seen_path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringConfig {
    pub log_level: String,
    pub log_json: bool,
    pub health_port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    pub requests_per_second: u32,
    pub burst_size: u32,
}

/// Secrets loaded exclusively from environment variables.
/// Not serializable, not stored in config files.
pub struct Secrets {
    pub newsapi_api_key: Option<SecretString>,
    pub finnhub_api_key: Option<SecretString>,
    pub discord_bot_token: Option<SecretString>,
    pub ops_webhook_url: Option<SecretString>,
}

impl Secrets {
    pub fn from_env() -> Self {
        Self {
            newsapi_api_key: env_secret("NEWSAPI_API_KEY"),
            finnhub_api_key: env_secret("FINNHUB_API_KEY"),
            discord_bot_token: env_secret("DISCORD_BOT_TOKEN"),
            ops_webhook_url: env_secret("OPS_WEBHOOK_URL"),
        }
    }
}

fn env_secret(name: &str) -> Option<SecretString> {
    std::env::var(name).ok().map(SecretString::from)
}

impl AppConfig {
    /// Load configuration from a TOML file, overlaying environment
    /// variables for secrets.
    pub fn load(config_path: &Path) -> Result<(Self, Secrets)> {
        dotenvy::dotenv().ok();

        let contents = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        let secrets = Secrets::from_env();

        Ok((config, secrets))
    }
}
