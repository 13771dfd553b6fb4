//! Database schema definitions and table creation.
//!
//! App-local storage is a single key-value table; each value is an opaque
//! string (the notification ledger stores a JSON array under one key).

use rusqlite::Connection;
use sc_core::error::{ScError, ScResult};
use tracing::info;

/// Create all database tables if they do not exist.
pub fn create_tables(conn: &Connection) -> ScResult<()> {
    conn.execute_batch(SCHEMA_SQL)
        .map_err(|e| ScError::Database(format!("failed to create schema: {e}")))?;
    info!("database schema verified");
    Ok(())
}

const SCHEMA_SQL: &str = r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL
);

-- App-local key-value storage
CREATE TABLE IF NOT EXISTS kv_store (
    key         TEXT PRIMARY KEY NOT NULL,
    value       TEXT NOT NULL,
    updated_at  INTEGER NOT NULL
);
"#;
