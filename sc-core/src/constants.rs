//! Application-wide constants.

/// Application name.
pub const APP_NAME: &str = "SpaceChat";

/// Application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Storage key holding the serialized notification ledger.
pub const LEDGER_STORAGE_KEY: &str = "notifications";

/// Title used when an inbound message carries none.
pub const DEFAULT_NOTIFICATION_TITLE: &str = "New Message";

/// Body used when an inbound message carries none.
pub const DEFAULT_NOTIFICATION_BODY: &str = "You have a new notification.";

/// Key in a message's data payload that carries the deep link.
pub const DEEP_LINK_DATA_KEY: &str = "link";

/// URL scheme registered by the app for deep links.
pub const DEEP_LINK_SCHEME: &str = "spacechat";

/// Default capacity of the application event bus.
pub const DEFAULT_EVENT_BUS_CAPACITY: usize = 256;

/// Database schema version.
pub const DB_SCHEMA_VERSION: i32 = 1;
