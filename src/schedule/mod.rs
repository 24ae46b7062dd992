//! Scheduler: three independent periodic timers sharing one application
//! context.
//!
//! Each timer runs in its own task with its tick body inline, so a slow
//! run delays only that timer's next tick (single-flight per timer) and
//! never the other timers. Missed ticks are skipped, not replayed.

pub mod jobs;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Timelike, Utc};
use chrono_tz::Tz;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

use crate::config::{AppConfig, Secrets};
use crate::gateway::discord::DiscordGateway;
use crate::gateway::MessagingGateway;
use crate::hours::TradingWindow;
use crate::monitoring::health::{HealthState, Timer};
use crate::monitoring::ops::OpsNotifier;
use crate::news::fetcher::NewsFetcher;
use crate::news::build_providers;
use crate::report::prices::QuoteClient;
use crate::report::renderer::MarkdownRenderer;
use crate::report::ReportGenerator;
use crate::store::seen::SeenStore;
use crate::store::symbols::SymbolStore;

/// Fires the daily report when the local clock is inside the first five
/// minutes of the configured hour.
const REPORT_WINDOW_MINUTES: u32 = 5;

/// Application context constructed once at startup and passed to every
/// scheduled job. No module-level globals.
pub struct App {
    pub config: AppConfig,
    pub tz: Tz,
    pub symbols: SymbolStore,
    pub seen: SeenStore,
    pub fetcher: NewsFetcher,
    pub gateway: Arc<dyn MessagingGateway>,
    pub ops: Arc<OpsNotifier>,
    pub report: ReportGenerator,
}

impl App {
    pub fn build(config: AppConfig, secrets: &Secrets) -> Result<Self> {
        let tz = config.schedule.tz()?;
        let symbols = SymbolStore::new(&config.storage.symbols_path);
        let seen = SeenStore::new(&config.storage.seen_path);

        let ops = Arc::new(OpsNotifier::new(
            secrets.ops_webhook_url.clone(),
            config.messaging.ops_enabled,
        ));

        let providers = build_providers(&config.news, &config.rate_limit, secrets);
        let fetcher = NewsFetcher::new(providers, seen.clone(), ops.clone());

        let token = secrets
            .discord_bot_token
            .clone()
            .context("DISCORD_BOT_TOKEN not set — cannot reach the messaging gateway")?;
        let gateway: Arc<dyn MessagingGateway> =
            Arc::new(DiscordGateway::new(&config.messaging.base_url, token)?);

        let quotes = QuoteClient::new(
            &config.report.quote_base_url,
            secrets.finnhub_api_key.clone(),
            Duration::from_secs(config.report.quote_timeout_seconds),
        );
        let renderer = Box::new(MarkdownRenderer::new(&config.report.artifact_dir));
        let report = ReportGenerator::new(quotes, renderer, &config.report.artifact_dir);

        Ok(Self {
            config,
            tz,
            symbols,
            seen,
            fetcher,
            gateway,
            ops,
            report,
        })
    }

    pub fn window(&self) -> TradingWindow {
        self.config.market_hours.window()
    }

    pub fn channel(&self) -> &str {
        &self.config.messaging.channel_id
    }

    pub fn local_now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.tz)
    }
}

pub struct Scheduler {
    app: Arc<App>,
    health: HealthState,
}

impl Scheduler {
    pub fn new(app: Arc<App>, health: HealthState) -> Self {
        Self { app, health }
    }

    /// Spawn the three timers and run until the process is stopped.
    pub async fn run(self) -> Result<()> {
        let sweep = tokio::spawn(sweep_loop(self.app.clone(), self.health.clone()));
        let digest = tokio::spawn(digest_loop(self.app.clone(), self.health.clone()));
        let report = tokio::spawn(report_loop(self.app.clone(), self.health.clone()));

        info!(
            sweep_interval_min = self.app.config.schedule.sweep_interval_minutes,
            digest_interval_h = self.app.config.schedule.digest_interval_hours,
            report_hour = self.app.config.schedule.report_hour,
            "Scheduler running"
        );

        let _ = tokio::join!(sweep, digest, report);
        Ok(())
    }
}

async fn sweep_loop(app: Arc<App>, health: HealthState) {
    let period = Duration::from_secs(app.config.schedule.sweep_interval_minutes * 60);
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        interval.tick().await;
        health.record_tick(Timer::Sweep);
        if let Err(e) = jobs::run_sweep(&app).await {
            error!(error = %e, "Sweep failed");
            app.ops.job_failure("sweep", &e.to_string()).await;
        }
    }
}

async fn digest_loop(app: Arc<App>, health: HealthState) {
    let period = Duration::from_secs(app.config.schedule.digest_interval_hours * 3_600);
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        interval.tick().await;
        health.record_tick(Timer::Digest);
        if let Err(e) = jobs::run_digest(&app).await {
            error!(error = %e, "Digest failed");
            app.ops.job_failure("digest", &e.to_string()).await;
        }
    }
}

async fn report_loop(app: Arc<App>, health: HealthState) {
    let mut interval = tokio::time::interval(Duration::from_secs(60));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut last_run: Option<NaiveDate> = None;

    loop {
        interval.tick().await;

        let now = app.local_now();
        if !report_window_open(now.hour(), now.minute(), app.config.schedule.report_hour) {
            continue;
        }
        let today = now.date_naive();
        if last_run == Some(today) {
            continue;
        }

        health.record_tick(Timer::Report);
        match jobs::run_report(&app, today).await {
            Ok(()) => {
                last_run = Some(today);
            }
            Err(e) => {
                error!(error = %e, "Report generation failed");
                app.ops.job_failure("report", &e.to_string()).await;
            }
        }
    }
}

/// The report boundary fires during the first few minutes of the
/// configured hour; the once-per-day latch in the loop keeps the
/// minute-granularity poll from re-firing within the window.
fn report_window_open(hour: u32, minute: u32, report_hour: u32) -> bool {
    hour == report_hour && minute < REPORT_WINDOW_MINUTES
}
