//! SpaceChat CLI - drive the notification core from a terminal.
//!
//! Simulates push deliveries in each app-lifecycle state, inspects and
//! mutates the persisted notification ledger, and opens deep links. Useful
//! for scripting, debugging, and exercising the core without a mobile host.

mod commands;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use console::style;
use tracing::info;

use sc_core::config::{AppConfig, ConfigHandle};
use sc_core::error::ScResult;
use sc_core::logging;
use sc_core::platform::Platform;

/// SpaceChat - notification history and unread badge.
#[derive(Parser)]
#[command(
    name = "spacechat",
    version,
    about = "SpaceChat notification core CLI",
    long_about = "A command-line interface for the SpaceChat notification core.\n\
                   Deliver push messages, list the notification history, and manage the unread badge."
)]
struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (text, json).
    #[arg(short = 'f', long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Keep the ledger in memory for this run only.
    #[arg(long, global = true)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// JSON output for scripting.
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Deliver one push message as if the messaging SDK had received it.
    Deliver(commands::deliver::DeliverArgs),
    /// Replay a file of delivery events and URLs (one JSON object per line).
    Replay {
        /// Path to the JSON-lines file.
        path: PathBuf,
    },
    /// List the notification history, newest first.
    List {
        /// Only show unread notifications.
        #[arg(short, long)]
        unread: bool,
    },
    /// Show the current unread badge count.
    Badge,
    /// Mark every notification as read.
    MarkAllRead,
    /// Mark one notification as read.
    MarkRead {
        /// Notification id.
        id: String,
    },
    /// Delete the whole notification history.
    Clear,
    /// Open a deep link (scheme://screen/params).
    Open {
        /// Deep-link URL.
        url: String,
    },
    /// View and initialize the configuration file.
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

/// Load the config file, or defaults when it does not exist.
///
/// With `lenient`, an unreadable or invalid file also yields defaults.
fn load_config(path: &Path, lenient: bool) -> ScResult<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    match AppConfig::load_from_file(path) {
        Ok(config) => Ok(config),
        Err(e) if lenient => {
            eprintln!(
                "{} ignoring {}: {e}",
                style("warning:").yellow().bold(),
                path.display()
            );
            Ok(AppConfig::default())
        }
        Err(e) => Err(e),
    }
}

#[tokio::main]
async fn main() -> ScResult<()> {
    let cli = Cli::parse();

    // Load configuration
    let config_path = match cli.config.as_deref() {
        Some(path) => PathBuf::from(path),
        None => AppConfig::default_config_path()?,
    };
    // `config` subcommands must still run against a broken file so it can be replaced.
    let lenient = matches!(cli.command, Commands::Config { .. });
    let config = load_config(&config_path, lenient)?;

    // Initialize logging
    let level_override = cli.verbose.then_some("debug");
    let _guard = if cli.ephemeral {
        logging::init_console_logging(level_override.unwrap_or(config.logging.level.as_str()));
        None
    } else {
        let log_dir = config.effective_log_dir()?;
        Some(logging::init_logging(&config.logging, &log_dir, level_override)?)
    };

    let config_handle = ConfigHandle::new(config);

    info!("SpaceChat CLI v{} ({})", sc_core::constants::APP_VERSION, Platform::current());

    // Dispatch to command handlers
    match cli.command {
        Commands::Deliver(args) => {
            commands::deliver::run(config_handle, args, cli.ephemeral, cli.format).await
        }
        Commands::Replay { path } => {
            commands::replay::run(config_handle, path, cli.ephemeral, cli.format).await
        }
        Commands::List { unread } => {
            commands::ledger::list(config_handle, unread, cli.ephemeral, cli.format).await
        }
        Commands::Badge => {
            commands::ledger::badge(config_handle, cli.ephemeral, cli.format).await
        }
        Commands::MarkAllRead => {
            commands::ledger::mark_all_read(config_handle, cli.ephemeral, cli.format).await
        }
        Commands::MarkRead { id } => {
            commands::ledger::mark_read(config_handle, &id, cli.ephemeral, cli.format).await
        }
        Commands::Clear => {
            commands::ledger::clear(config_handle, cli.ephemeral, cli.format).await
        }
        Commands::Open { url } => {
            commands::open::run(config_handle, &url, cli.format).await
        }
        Commands::Config { action } => {
            commands::config::run(config_handle, config_path, action, cli.format).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sc_core::error::ScError;

    #[test]
    fn test_load_config_missing_file_uses_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = load_config(&dir.path().join("config.toml"), false).unwrap();
        assert_eq!(config.storage.ledger_key, "notifications");
    }

    #[test]
    fn test_load_config_invalid_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[storage\nledger_key = ").unwrap();

        assert!(matches!(load_config(&path, false), Err(ScError::Config(_))));
        let config = load_config(&path, true).unwrap();
        assert_eq!(config.storage.ledger_key, "notifications");
    }

    #[test]
    fn test_config_init_force_parses_with_broken_file() {
        let cli = Cli::try_parse_from(["spacechat", "config", "init", "--force"]).unwrap();
        assert!(matches!(cli.command, Commands::Config { .. }));
    }
}
