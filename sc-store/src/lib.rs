//! SpaceChat Store - Local key-value storage and persisted record models.
//!
//! This crate owns all data persistence: SQLite database initialization,
//! the key-value table that backs app-local storage, versioned migrations,
//! and the notification record model that is serialized into it.

pub mod db;
pub mod schema;
pub mod migrations;
pub mod kv;
pub mod models;

// Re-export key types
pub use db::Database;
pub use kv::{KeyValueStore, MemoryKvStore, SqliteKvStore};
pub use models::notification_record::NotificationRecord;
