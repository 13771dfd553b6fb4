//! Structured logging setup using the `tracing` ecosystem.
//!
//! Console output goes to stderr; a second layer writes a daily-rotated
//! `spacechat.log`, either human-readable or JSON.

use std::path::Path;
use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;
use crate::error::ScResult;

/// File name prefix of the rotated log file.
const LOG_FILE_NAME: &str = "spacechat.log";

/// Initialize the global tracing subscriber from the logging configuration.
///
/// `level_override` takes precedence over `config.level` (used by `--verbose`).
/// An invalid filter string falls back to `info`.
pub fn init_logging(
    config: &LoggingConfig,
    log_dir: &Path,
    level_override: Option<&str>,
) -> ScResult<LogGuard> {
    std::fs::create_dir_all(log_dir)?;

    let level = level_override.unwrap_or(&config.level);
    let file_appender = rolling::daily(log_dir, LOG_FILE_NAME);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .compact();

    let registry = tracing_subscriber::registry()
        .with(make_filter(level))
        .with(console_layer);

    if config.json_output {
        registry
            .with(
                fmt::layer()
                    .with_writer(non_blocking)
                    .json()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_writer(non_blocking)
                    .with_ansi(false)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .init();
    }

    tracing::info!("logging initialized at level={level}, dir={}", log_dir.display());

    Ok(LogGuard { _guard: guard })
}

/// Guard that keeps the non-blocking log writer alive.
/// Drop this to flush and close the log file.
pub struct LogGuard {
    _guard: tracing_appender::non_blocking::WorkerGuard,
}

/// Initialize a minimal console-only logger for tests and `--ephemeral` runs.
///
/// Safe to call repeatedly; only the first call installs a subscriber.
pub fn init_console_logging(level: &str) {
    let _ = tracing_subscriber::registry()
        .with(make_filter(level))
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true).compact())
        .try_init();
}

fn make_filter(level: &str) -> EnvFilter {
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"))
}
