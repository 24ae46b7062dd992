use anyhow::Result;
use clap::Parser;

use newsdesk::cli::{self, Cli, Command};
use newsdesk::config::AppConfig;
use newsdesk::monitoring::logger;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let (config, secrets) = AppConfig::load(&cli.config)?;

    logger::init_logging(&config.monitoring)?;

    match cli.command {
        Command::Run => cli::run_agent(config, secrets).await,
        Command::Add { symbol } => cli::run_add(&config, &secrets, &symbol).await,
        Command::Remove { symbol } => cli::run_remove(&config, &symbol),
        Command::List => cli::run_list(&config),
        Command::News { symbol } => cli::run_news(&config, &secrets, symbol.as_deref()).await,
        Command::Revalidate => cli::run_revalidate(&config, &secrets).await,
    }
}
