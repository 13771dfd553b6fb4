//! Notification ledger.
//!
//! The ledger is the full notification history, stored as one JSON array
//! under one storage key and rewritten in full on every mutation. Storage
//! failures never reach the caller: `load` degrades to an empty ledger and
//! `save` logs and reports `false`.
//!
//! The transformations (`upsert`, `mark_all_read`, `mark_read`) are pure
//! functions over the in-memory list; serializing access to the stored
//! value is the caller's job (see `NotificationCenter`).

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, error, warn};

use sc_store::{KeyValueStore, NotificationRecord};

/// One delivery event, ready to be merged into the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingNotification {
    pub id: String,
    pub title: String,
    pub body: String,
    pub data: Option<HashMap<String, String>>,
    /// Value the record's `read` flag is forced to.
    pub read: bool,
}

/// Handle on the persisted ledger value.
#[derive(Clone)]
pub struct NotificationLedger {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl NotificationLedger {
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Storage key holding the ledger.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Read the whole ledger. Missing or unreadable data yields an empty list.
    pub fn load(&self) -> Vec<NotificationRecord> {
        let raw = match self.store.get_item(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("ledger: nothing stored under {}", self.key);
                return Vec::new();
            }
            Err(e) => {
                error!("ledger: failed to read {}: {e}", self.key);
                return Vec::new();
            }
        };

        match NotificationRecord::list_from_json(&raw) {
            Ok(records) => records,
            Err(e) => {
                warn!("ledger: discarding corrupt value under {}: {e}", self.key);
                Vec::new()
            }
        }
    }

    /// Overwrite the stored ledger. Returns whether the write went through.
    pub fn save(&self, records: &[NotificationRecord]) -> bool {
        let json = match NotificationRecord::list_to_json(records) {
            Ok(json) => json,
            Err(e) => {
                error!("ledger: failed to serialize {} records: {e}", records.len());
                return false;
            }
        };

        match self.store.set_item(&self.key, &json) {
            Ok(()) => {
                debug!("ledger: saved {} records", records.len());
                true
            }
            Err(e) => {
                error!("ledger: failed to write {}: {e}", self.key);
                false
            }
        }
    }

    /// Remove the stored ledger entirely. Returns whether anything was removed.
    pub fn clear(&self) -> bool {
        match self.store.remove_item(&self.key) {
            Ok(removed) => removed,
            Err(e) => {
                error!("ledger: failed to clear {}: {e}", self.key);
                false
            }
        }
    }
}

/// Merge `incoming` into `records` by id.
///
/// A matching record gets the new title and body, the new data when the
/// event carries any, `timestamp = now`, and the forced `read` value.
/// Otherwise a new record is appended.
pub fn upsert(
    mut records: Vec<NotificationRecord>,
    incoming: IncomingNotification,
    now: i64,
) -> Vec<NotificationRecord> {
    match records.iter_mut().find(|r| r.id == incoming.id) {
        Some(existing) => {
            existing.title = incoming.title;
            existing.body = incoming.body;
            if incoming.data.is_some() {
                existing.data = incoming.data;
            }
            existing.timestamp = now;
            existing.read = incoming.read;
        }
        None => records.push(NotificationRecord {
            id: incoming.id,
            title: incoming.title,
            body: incoming.body,
            timestamp: now,
            read: incoming.read,
            data: incoming.data,
        }),
    }
    records
}

/// Flag every record as read.
pub fn mark_all_read(mut records: Vec<NotificationRecord>) -> Vec<NotificationRecord> {
    for record in &mut records {
        record.read = true;
    }
    records
}

/// Flag one record as read. The flag is `false` if no record has that id.
pub fn mark_read(
    mut records: Vec<NotificationRecord>,
    id: &str,
) -> (Vec<NotificationRecord>, bool) {
    let found = match records.iter_mut().find(|r| r.id == id) {
        Some(record) => {
            record.read = true;
            true
        }
        None => false,
    };
    (records, found)
}

/// Newest first. Records with equal timestamps keep their stored order.
pub fn sort_for_display(records: &mut [NotificationRecord]) {
    records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

/// Id for a message the platform delivered without one: the timestamp in
/// milliseconds, suffixed when that id is already taken.
pub fn generate_id(records: &[NotificationRecord], now: i64) -> String {
    let base = now.to_string();
    let taken = |candidate: &str| records.iter().any(|r| r.id == candidate);
    if !taken(&base) {
        return base;
    }
    let mut n = 1u32;
    loop {
        let candidate = format!("{base}-{n}");
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}
