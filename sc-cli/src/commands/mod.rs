//! CLI command implementations.

pub mod config;
pub mod deliver;
pub mod ledger;
pub mod open;
pub mod replay;

use std::sync::Arc;

use console::style;

use sc_core::config::ConfigHandle;
use sc_core::error::ScResult;
use sc_services::{EventBus, Navigator, NotificationCenter, Service, TracingBadgeSink};
use sc_store::{Database, KeyValueStore, MemoryKvStore, NotificationRecord, SqliteKvStore};
use crate::OutputFormat;

/// Navigator for a terminal host: prints the destination screen.
///
/// Silent under JSON output so stdout stays machine-readable.
pub struct TerminalNavigator {
    format: OutputFormat,
}

impl TerminalNavigator {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }
}

impl Navigator for TerminalNavigator {
    fn navigate(&self, screen: &str, params: Option<&str>) -> ScResult<()> {
        if self.format == OutputFormat::Json {
            return Ok(());
        }
        match params {
            Some(params) => println!("{} {} ({})", style("->").cyan(), style(screen).bold(), params),
            None => println!("{} {}", style("->").cyan(), style(screen).bold()),
        }
        Ok(())
    }
}

/// Helper to open the ledger store from config.
pub async fn open_store(config: &ConfigHandle, ephemeral: bool) -> ScResult<Arc<dyn KeyValueStore>> {
    if ephemeral {
        return Ok(Arc::new(MemoryKvStore::new()));
    }
    let cfg = config.read().await;
    let db_path = cfg.effective_db_path()?;
    let db = Database::init(&db_path, &cfg.storage)?;
    Ok(Arc::new(SqliteKvStore::new(db)))
}

/// Helper to start a notification center with a terminal navigator and a
/// logging badge sink, refreshed once so the snapshot reflects storage.
pub async fn start_center(
    config: &ConfigHandle,
    ephemeral: bool,
    format: OutputFormat,
) -> ScResult<NotificationCenter> {
    let store = open_store(config, ephemeral).await?;
    let cfg = config.snapshot().await;

    let mut center = NotificationCenter::new(
        store,
        &cfg.storage.ledger_key,
        cfg.notifications.clone(),
        EventBus::new(cfg.event_bus.capacity),
    )
    .with_navigator(Arc::new(TerminalNavigator::new(format)));
    center.init()?;
    center.attach_badge_sink(Arc::new(TracingBadgeSink));
    center.refresh().await;
    Ok(center)
}

/// Format an epoch-millisecond timestamp in local time.
pub fn format_timestamp(millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| millis.to_string())
}

/// Truncate a string to a maximum number of characters, appending an
/// ellipsis if truncated.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len > 3 {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{kept}...")
    } else {
        s.chars().take(max_len).collect()
    }
}

/// Print one record as a short block of text.
pub fn print_record(record: &NotificationRecord) {
    let marker = if record.read {
        style("read").dim()
    } else {
        style("unread").yellow().bold()
    };
    println!("{} [{}]", style(&record.id).bold(), marker);
    println!("  {}", record.title);
    println!("  {}", record.body);
    println!("  {}", style(format_timestamp(record.timestamp)).dim());
    if let Some(data) = &record.data {
        let mut keys: Vec<_> = data.keys().collect();
        keys.sort();
        for key in keys {
            println!("  {} = {}", style(key).cyan(), data[key]);
        }
    }
}
