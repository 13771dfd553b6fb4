//! Shared test utilities for integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use sc_core::config::{AppConfig, StorageConfig};
use sc_core::error::{ScError, ScResult};
use sc_services::{
    BadgeSink, EventBus, InboundMessage, Navigator, NotificationCenter, Service,
};
use sc_store::{Database, KeyValueStore, SqliteKvStore};
use tempfile::TempDir;

/// Create a SQLite-backed key-value store in a temporary directory.
/// The TempDir must be held alive for the duration of the test.
pub fn create_test_store() -> (Arc<SqliteKvStore>, TempDir) {
    let dir = TempDir::new().expect("failed to create temp dir");
    let store = open_store(&dir);
    (store, dir)
}

/// Open (or reopen) the test database inside `dir`.
pub fn open_store(dir: &TempDir) -> Arc<SqliteKvStore> {
    let path = dir.path().join("test.db");
    let db = Database::init(&path, &StorageConfig::default()).expect("failed to init test database");
    Arc::new(SqliteKvStore::new(db))
}

/// Create an EventBus with a buffer large enough for a whole test.
pub fn create_test_event_bus() -> EventBus {
    EventBus::new(256)
}

/// Build and start a center over `store` with default settings.
pub fn start_center(
    store: Arc<dyn KeyValueStore>,
    bus: EventBus,
    navigator: Option<Arc<RecordingNavigator>>,
) -> NotificationCenter {
    let config = AppConfig::default();
    let mut center = NotificationCenter::new(
        store,
        &config.storage.ledger_key,
        config.notifications.clone(),
        bus,
    );
    if let Some(nav) = navigator {
        center = center.with_navigator(nav);
    }
    center.init().expect("center init");
    center
}

/// Foreground-style message with a notification block.
pub fn notification(id: &str, title: &str, body: &str) -> InboundMessage {
    InboundMessage::new(Some(id.to_string()))
        .with_notification(Some(title.to_string()), Some(body.to_string()))
}

/// Badge sink that remembers every count it was given.
#[derive(Default)]
pub struct RecordingBadge {
    pub counts: Mutex<Vec<usize>>,
}

impl RecordingBadge {
    pub fn last(&self) -> Option<usize> {
        self.counts.lock().unwrap().last().copied()
    }
}

impl BadgeSink for RecordingBadge {
    fn set_badge_count(&self, count: usize) -> ScResult<()> {
        self.counts.lock().unwrap().push(count);
        Ok(())
    }
}

/// Navigator that remembers every screen it was asked to open.
#[derive(Default)]
pub struct RecordingNavigator {
    pub visits: Mutex<Vec<(String, Option<String>)>>,
}

impl RecordingNavigator {
    pub fn visits(&self) -> Vec<(String, Option<String>)> {
        self.visits.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, screen: &str, params: Option<&str>) -> ScResult<()> {
        if screen.is_empty() {
            return Err(ScError::Navigation("empty screen".into()));
        }
        self.visits
            .lock()
            .unwrap()
            .push((screen.to_string(), params.map(str::to_owned)));
        Ok(())
    }
}
