//! Logging set-up: stderr plus an optional append-mode log file.

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::Layer;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::LoggingConfig;

/// Parse a configured level name; `None` for anything unrecognised.
pub fn parse_level(level: &str) -> Option<LevelFilter> {
    match level.trim().to_ascii_lowercase().as_str() {
        "error" => Some(LevelFilter::ERROR),
        "warn" | "warning" => Some(LevelFilter::WARN),
        "info" => Some(LevelFilter::INFO),
        "debug" => Some(LevelFilter::DEBUG),
        "trace" => Some(LevelFilter::TRACE),
        "off" => Some(LevelFilter::OFF),
        _ => None,
    }
}

/// Level from config, raised to at least `debug` by `--verbose`.
pub fn effective_level(config: &LoggingConfig, verbose: bool) -> LevelFilter {
    let configured = parse_level(&config.level).unwrap_or(LevelFilter::INFO);
    if verbose {
        configured.max(LevelFilter::DEBUG)
    } else {
        configured
    }
}

/// Install the global subscriber. Call once, before any work is done.
pub fn init_logging(config: &LoggingConfig, verbose: bool) -> Result<()> {
    let level = effective_level(config, verbose);

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(level);

    let file_layer = match config.resolved_file() {
        Some(path) => {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create log directory {}", parent.display())
                })?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(
                fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_filter(level),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to install the logging subscriber")?;

    if parse_level(&config.level).is_none() {
        tracing::warn!(
            "Unknown log level '{}', falling back to info",
            config.level
        );
    }
    Ok(())
}
