//! Persisted record models.

pub mod notification_record;
