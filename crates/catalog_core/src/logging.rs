use anyhow::{Context, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::CatalogConfig;

/// Crates whose events are always kept at debug.
const REPORT_CRATES: [&str; 2] = ["catalog_docs", "catalog_products"];

/// Log file name prefix inside the logs directory.
const LOG_FILE_PREFIX: &str = "catalog";

/// Filter for the configured level, with the report crates at debug.
///
/// `RUST_LOG` replaces the whole filter when set. The configured level is
/// validated either way so a typo in the config file is not hidden.
fn config_filter(level: &str) -> Result<EnvFilter> {
    let level = level.trim().to_ascii_lowercase();
    level
        .parse::<LevelFilter>()
        .with_context(|| format!("Invalid log_level '{level}'"))?;

    if let Ok(from_env) = EnvFilter::try_from_default_env() {
        return Ok(from_env);
    }

    let directives = REPORT_CRATES
        .iter()
        .map(|name| format!("{name}=debug"))
        .fold(level, |acc, directive| format!("{acc},{directive}"));
    EnvFilter::try_new(&directives).with_context(|| format!("Invalid log filter '{directives}'"))
}

/// Install the global subscriber: daily log file under `~/.catalog/logs`
/// plus compact console output.
///
/// The returned guard flushes the file writer and must outlive the service.
pub fn init_logging(config: &CatalogConfig) -> Result<WorkerGuard> {
    let logs_dir = CatalogConfig::logs_dir()?;
    init_logging_in(&logs_dir, config)
}

/// Same as [`init_logging`] with an explicit logs directory.
pub fn init_logging_in(logs_dir: &Path, config: &CatalogConfig) -> Result<WorkerGuard> {
    let filter = config_filter(&config.log_level)?;

    std::fs::create_dir_all(logs_dir)
        .with_context(|| format!("Failed to create logs dir: {}", logs_dir.display()))?;
    let file_appender = tracing_appender::rolling::daily(logs_dir, LOG_FILE_PREFIX);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .with_writer(file_writer),
        )
        .with(fmt::layer().with_target(false).compact())
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;

    Ok(guard)
}
