//! Config commands.

use std::path::PathBuf;

use clap::Subcommand;
use console::style;

use sc_core::config::{AppConfig, ConfigHandle};
use sc_core::error::{ScError, ScResult};
use crate::OutputFormat;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the effective configuration.
    Show,
    /// Print the configuration file path.
    Path,
    /// Write a configuration file with default values.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

pub async fn run(
    config: ConfigHandle,
    path: PathBuf,
    action: ConfigAction,
    format: OutputFormat,
) -> ScResult<()> {
    match action {
        ConfigAction::Show => {
            let cfg = config.snapshot().await;
            match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&cfg)?);
                }
                OutputFormat::Text => {
                    let text = toml::to_string_pretty(&cfg)
                        .map_err(|e| ScError::Config(format!("failed to serialize config: {e}")))?;
                    println!("{}", style(format!("# {}", path.display())).dim());
                    print!("{text}");
                }
            }
        }
        ConfigAction::Path => match format {
            OutputFormat::Json => {
                println!("{}", serde_json::json!({ "path": path, "exists": path.exists() }));
            }
            OutputFormat::Text => println!("{}", path.display()),
        },
        ConfigAction::Init { force } => {
            if path.exists() && !force {
                return Err(ScError::Config(format!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                )));
            }
            AppConfig::default().save_to_file(&path)?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::json!({ "path": path })),
                OutputFormat::Text => {
                    println!("{} {}", style("Wrote").green().bold(), path.display());
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_init_refuses_to_overwrite() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let handle = ConfigHandle::new(AppConfig::default());

        run(handle.clone(), path.clone(), ConfigAction::Init { force: false }, OutputFormat::Json)
            .await
            .unwrap();
        assert!(AppConfig::load_from_file(&path).is_ok());

        let again = run(handle.clone(), path.clone(), ConfigAction::Init { force: false }, OutputFormat::Json).await;
        assert!(matches!(again, Err(ScError::Config(_))));

        run(handle, path, ConfigAction::Init { force: true }, OutputFormat::Json)
            .await
            .unwrap();
    }
}
