//! Application configuration management.
//!
//! Handles loading, saving, and accessing application configuration: where
//! the notification ledger is stored, how logging behaves, and the defaults
//! applied to inbound messages. Configuration is persisted as TOML on disk.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::{ScError, ScResult};
use crate::platform::Platform;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Local storage settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Notification ledger and payload defaults.
    #[serde(default)]
    pub notifications: NotificationConfig,

    /// Event bus settings.
    #[serde(default)]
    pub event_bus: EventBusConfig,
}

/// Local key-value storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite database file. If empty, uses default location.
    #[serde(default)]
    pub path: String,

    /// Enable WAL (Write-Ahead Logging) mode.
    #[serde(default = "default_true")]
    pub wal_mode: bool,

    /// Maximum number of connections in the pool.
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,

    /// Run integrity check on startup.
    #[serde(default = "default_true")]
    pub integrity_check_on_startup: bool,

    /// Key under which the serialized ledger is stored.
    #[serde(default = "default_ledger_key")]
    pub ledger_key: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or filter directive: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for log files. If empty, uses default location.
    #[serde(default)]
    pub directory: String,

    /// Enable JSON structured logging output for the log file.
    #[serde(default)]
    pub json_output: bool,
}

/// Defaults applied when normalizing inbound messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Title used when the payload carries none.
    #[serde(default = "default_title")]
    pub default_title: String,

    /// Body used when the payload carries none.
    #[serde(default = "default_body")]
    pub default_body: String,

    /// Data key carrying the deep link URL.
    #[serde(default = "default_deep_link_key")]
    pub deep_link_key: String,
}

/// Event bus configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventBusConfig {
    /// Broadcast channel capacity.
    #[serde(default = "default_event_bus_capacity")]
    pub capacity: usize,
}

// Default value functions for serde

fn default_true() -> bool {
    true
}

fn default_pool_size() -> u32 {
    4
}

fn default_ledger_key() -> String {
    constants::LEDGER_STORAGE_KEY.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_title() -> String {
    constants::DEFAULT_NOTIFICATION_TITLE.to_string()
}

fn default_body() -> String {
    constants::DEFAULT_NOTIFICATION_BODY.to_string()
}

fn default_deep_link_key() -> String {
    constants::DEEP_LINK_DATA_KEY.to_string()
}

fn default_event_bus_capacity() -> usize {
    constants::DEFAULT_EVENT_BUS_CAPACITY
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: String::new(),
            wal_mode: true,
            pool_size: default_pool_size(),
            integrity_check_on_startup: true,
            ledger_key: default_ledger_key(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: String::new(),
            json_output: false,
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            default_title: default_title(),
            default_body: default_body(),
            deep_link_key: default_deep_link_key(),
        }
    }
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            capacity: default_event_bus_capacity(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default config file path, falling back to
    /// defaults when no file exists yet.
    pub fn load_default() -> ScResult<Self> {
        let path = Self::default_config_path()?;
        if path.exists() {
            Self::load_from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from_file(path: &Path) -> ScResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a specific file path.
    pub fn save_to_file(&self, path: &Path) -> ScResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)
            .map_err(|e| ScError::Config(format!("failed to serialize config: {e}")))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> ScResult<PathBuf> {
        Ok(Platform::config_dir()?.join("config.toml"))
    }

    /// Reject values the services cannot run with.
    pub fn validate(&self) -> ScResult<()> {
        if self.storage.ledger_key.trim().is_empty() {
            return Err(ScError::MissingConfig("storage.ledger_key".into()));
        }
        if self.storage.pool_size == 0 {
            return Err(ScError::Config("storage.pool_size must be at least 1".into()));
        }
        if self.event_bus.capacity == 0 {
            return Err(ScError::Config("event_bus.capacity must be at least 1".into()));
        }
        Ok(())
    }

    /// Get the effective database path, using the configured path or the default.
    pub fn effective_db_path(&self) -> ScResult<PathBuf> {
        if self.storage.path.is_empty() {
            Ok(Platform::data_dir()?.join("spacechat.db"))
        } else {
            Ok(PathBuf::from(&self.storage.path))
        }
    }

    /// Get the effective log directory, using the configured path or the default.
    pub fn effective_log_dir(&self) -> ScResult<PathBuf> {
        if self.logging.directory.is_empty() {
            Ok(Platform::data_dir()?.join("logs"))
        } else {
            Ok(PathBuf::from(&self.logging.directory))
        }
    }
}

/// Thread-safe configuration holder for shared access across services.
#[derive(Clone)]
pub struct ConfigHandle {
    inner: Arc<RwLock<AppConfig>>,
}

impl ConfigHandle {
    /// Create a new configuration handle.
    pub fn new(config: AppConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// Read the configuration.
    pub async fn read(&self) -> tokio::sync::RwLockReadGuard<'_, AppConfig> {
        self.inner.read().await
    }

    /// Write/update the configuration.
    pub async fn write(&self) -> tokio::sync::RwLockWriteGuard<'_, AppConfig> {
        self.inner.write().await
    }

    /// Clone out the current configuration.
    pub async fn snapshot(&self) -> AppConfig {
        self.inner.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert!(config.storage.wal_mode);
        assert_eq!(config.storage.ledger_key, "notifications");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.notifications.default_title, "New Message");
        assert_eq!(config.notifications.deep_link_key, "link");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [notifications]
            default_title = "Ping"
            "#,
        )
        .unwrap();
        assert_eq!(config.notifications.default_title, "Ping");
        assert_eq!(config.notifications.default_body, "You have a new notification.");
        assert_eq!(config.storage.pool_size, 4);
    }

    #[test]
    fn test_validate_rejects_empty_ledger_key() {
        let mut config = AppConfig::default();
        config.storage.ledger_key = "  ".into();
        assert!(matches!(config.validate(), Err(ScError::MissingConfig(_))));
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = AppConfig::default();
        config.storage.path = "/tmp/ledger.db".into();
        config.logging.json_output = true;
        config.save_to_file(&path).unwrap();

        let loaded = AppConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.storage.path, "/tmp/ledger.db");
        assert!(loaded.logging.json_output);
        assert_eq!(loaded.effective_db_path().unwrap(), PathBuf::from("/tmp/ledger.db"));
    }

    #[tokio::test]
    async fn test_config_handle_write() {
        let handle = ConfigHandle::new(AppConfig::default());
        handle.write().await.notifications.default_body = "hello".into();
        assert_eq!(handle.snapshot().await.notifications.default_body, "hello");
    }
}
