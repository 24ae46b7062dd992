//! The three scheduled jobs.
//!
//! Sweep and digest consult the market-hours gate first and no-op
//! silently when closed: no side effects, no error. The report boundary
//! has its own time window and runs regardless of the gate; it defines
//! the day boundary for dedup state.

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use tracing::{debug, info, warn};

use crate::delivery::{assemble, chunk, CHUNK_BUDGET, DIGEST_HEADER, SWEEP_HEADER};
use crate::hours::is_open;
use crate::schedule::App;

/// Short-interval fetch-and-post cycle. Stays silent when nothing is new.
pub async fn run_sweep(app: &App) -> Result<()> {
    let now = app.local_now();
    if !is_open(now, app.window()) {
        debug!("Market closed — sweep skipped");
        return Ok(());
    }

    let symbols = app.symbols.load();
    if symbols.is_empty() {
        debug!("No tracked symbols — sweep skipped");
        return Ok(());
    }

    let today = now.date_naive();
    let blocks = collect_blocks(app, today).await;
    if blocks.is_empty() {
        info!(symbols = symbols.len(), "Sweep found nothing new");
        return Ok(());
    }

    let text = blocks.join("\n\n");
    app.gateway.send(app.channel(), SWEEP_HEADER).await?;
    for piece in chunk(&text, CHUNK_BUDGET) {
        app.gateway.send(app.channel(), &piece).await?;
    }

    info!(
        symbols = symbols.len(),
        symbols_with_news = blocks.len(),
        "Sweep delivered"
    );
    app.ops.sweep_complete(symbols.len(), blocks.len()).await;
    Ok(())
}

/// Long-interval consolidated cycle. Emits the no-news sentinel instead
/// of staying silent; shares the dedup store with the sweep, so it
/// typically yields nothing new if a sweep just ran.
pub async fn run_digest(app: &App) -> Result<()> {
    let now = app.local_now();
    if !is_open(now, app.window()) {
        debug!("Market closed — digest skipped");
        return Ok(());
    }

    let symbols = app.symbols.load();
    let today = now.date_naive();
    let blocks = collect_blocks(app, today).await;
    let text = assemble(&blocks);

    app.gateway.send(app.channel(), DIGEST_HEADER).await?;
    for piece in chunk(&text, CHUNK_BUDGET) {
        app.gateway.send(app.channel(), &piece).await?;
    }

    info!(symbols = symbols.len(), "Digest delivered");
    app.ops.digest_complete(symbols.len()).await;
    Ok(())
}

/// Once-daily report boundary: generate and deliver the report artifact,
/// purge old channel history, then wipe dedup state and artifacts.
pub async fn run_report(app: &App, date: NaiveDate) -> Result<()> {
    let symbols: Vec<String> = app.symbols.load().keys().cloned().collect();

    let artifact = app.report.generate(date, &symbols).await?;
    let caption = format!("📊 **Daily report — {date}**");
    app.gateway
        .send_with_attachment(app.channel(), &caption, &artifact)
        .await?;

    // Purge failure must not block the day-boundary reset
    if let Err(e) = app.gateway.purge_older_than(app.channel(), Utc::now()).await {
        warn!(error = %e, "Channel purge failed");
    }

    app.seen.reset()?;
    app.report.clear_artifacts()?;

    info!(date = %date, symbols = symbols.len(), "Report delivered, dedup state reset");
    app.ops.report_delivered(date).await;
    Ok(())
}

/// Fetch every tracked symbol in stored order, one block per symbol with
/// fresh headlines.
async fn collect_blocks(app: &App, today: NaiveDate) -> Vec<String> {
    let mut blocks = Vec::new();
    for symbol in app.symbols.load().keys() {
        let lines = app.fetcher.fetch_symbol_news(symbol, today).await;
        if !lines.is_empty() {
            blocks.push(format!("**{symbol}**\n{}", lines.join("\n")));
        }
    }
    blocks
}
