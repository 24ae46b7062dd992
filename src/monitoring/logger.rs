use anyhow::Result;
use tracing_subscriber::EnvFilter;

use crate::config::MonitoringConfig;

/// Initialize the global subscriber. JSON output for the long-running
/// agent; human-readable output when `log_json` is off (manual CLI
/// commands).
pub fn init_logging(config: &MonitoringConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if config.log_json {
        builder
            .json()
            .with_file(true)
            .with_line_number(true)
            .init();
    } else {
        builder.init();
    }

    Ok(())
}
