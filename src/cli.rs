//! Command surface: the scheduled agent plus the manual symbol-list and
//! news commands. Manual commands always print a visible reply, since
//! the invoking user is waiting synchronously.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use crate::config::{AppConfig, Secrets};
use crate::delivery::assemble;
use crate::monitoring::health::{spawn_health_server, HealthState};
use crate::monitoring::ops::OpsNotifier;
use crate::news::build_providers;
use crate::news::fetcher::NewsFetcher;
use crate::refdata::SymbolClassifier;
use crate::schedule::{App, Scheduler};
use crate::store::seen::SeenStore;
use crate::store::symbols::{normalize, SymbolStore};

#[derive(Debug, Parser)]
#[command(name = "newsdesk", about = "Scheduled stock-news notification agent", version)]
pub struct Cli {
    /// Path to the TOML config file
    #[arg(long, default_value = "config/default.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the scheduled agent until stopped
    Run,
    /// Track a symbol (classified via reference-data lookup)
    Add { symbol: String },
    /// Stop tracking a symbol
    Remove { symbol: String },
    /// List tracked symbols
    List,
    /// Fetch fresh headlines now, for one symbol or the whole list
    News { symbol: Option<String> },
    /// Re-run the classification lookup for every tracked symbol
    Revalidate,
}

/// Start the agent: startup checks, health endpoint, scheduler.
pub async fn run_agent(config: AppConfig, secrets: Secrets) -> Result<()> {
    let app = Arc::new(App::build(config, &secrets)?);

    // Startup hook: an unreachable gateway is fatal. Everything after
    // startup degrades gracefully.
    app.gateway
        .ping()
        .await
        .context("Messaging gateway unreachable at startup")?;

    let tracked = app.symbols.load().len();
    info!(tracked, "Agent started");
    app.ops.startup(tracked).await;

    let health = HealthState::new();
    let health_handle = spawn_health_server(health.clone(), app.config.monitoring.health_port);

    let result = Scheduler::new(app, health).run().await;

    health_handle.abort();
    result
}

pub async fn run_add(config: &AppConfig, secrets: &Secrets, symbol: &str) -> Result<()> {
    let store = SymbolStore::new(&config.storage.symbols_path);
    let classifier = SymbolClassifier::new(
        &config.news.finnhub_base_url,
        secrets.finnhub_api_key.clone(),
    );

    let symbol = normalize(symbol);
    let kind = classifier.classify(&symbol).await;

    if store.add(&symbol, kind)? {
        println!("✅ Added {symbol} ({kind}) to the tracked list.");
    } else {
        println!("{symbol} is already being tracked.");
    }
    Ok(())
}

pub fn run_remove(config: &AppConfig, symbol: &str) -> Result<()> {
    let store = SymbolStore::new(&config.storage.symbols_path);
    let symbol = normalize(symbol);

    if store.remove(&symbol)? {
        println!("✅ Removed {symbol}.");
    } else {
        println!("{symbol} not found.");
    }
    Ok(())
}

pub fn run_list(config: &AppConfig) -> Result<()> {
    let store = SymbolStore::new(&config.storage.symbols_path);
    let symbols = store.load();

    if symbols.is_empty() {
        println!("No symbols being tracked.");
        return Ok(());
    }

    println!("📈 Tracked symbols:");
    for (symbol, kind) in &symbols {
        println!("  {symbol} ({kind})");
    }
    Ok(())
}

/// On-demand fetch through the same dedup pipeline the sweep uses.
pub async fn run_news(config: &AppConfig, secrets: &Secrets, symbol: Option<&str>) -> Result<()> {
    let store = SymbolStore::new(&config.storage.symbols_path);
    let seen = SeenStore::new(&config.storage.seen_path);
    let providers = build_providers(&config.news, &config.rate_limit, secrets);
    let fetcher = NewsFetcher::new(providers, seen, Arc::new(OpsNotifier::disabled()));

    let symbols: Vec<String> = match symbol {
        Some(s) => vec![normalize(s)],
        None => store.load().keys().cloned().collect(),
    };
    if symbols.is_empty() {
        println!("No symbols being tracked.");
        return Ok(());
    }

    let today = chrono::Utc::now()
        .with_timezone(&config.schedule.tz()?)
        .date_naive();

    let mut blocks = Vec::new();
    for symbol in &symbols {
        let lines = fetcher.fetch_symbol_news(symbol, today).await;
        if !lines.is_empty() {
            blocks.push(format!("**{symbol}**\n{}", lines.join("\n")));
        }
    }

    println!("{}", assemble(&blocks));
    Ok(())
}

pub async fn run_revalidate(config: &AppConfig, secrets: &Secrets) -> Result<()> {
    let store = SymbolStore::new(&config.storage.symbols_path);
    let classifier = SymbolClassifier::new(
        &config.news.finnhub_base_url,
        secrets.finnhub_api_key.clone(),
    );

    let symbols = store.load();
    if symbols.is_empty() {
        println!("No symbols being tracked.");
        return Ok(());
    }

    for (symbol, old_kind) in &symbols {
        let kind = classifier.classify(symbol).await;
        store.reclassify(symbol, kind)?;
        if kind == *old_kind {
            println!("{symbol}: {kind}");
        } else {
            println!("{symbol}: {old_kind} → {kind}");
        }
    }
    Ok(())
}
