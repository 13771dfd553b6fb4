//! SpaceChat Services - notification ledger and delivery handling.
//!
//! This crate provides:
//! - Inbound message normalization and delivery classification
//! - The notification ledger (load, save, upsert, mark read)
//! - Unread badge projection and publishing
//! - Deep-link parsing and routing to a navigation collaborator
//! - `NotificationCenter`, the single-writer owner of all ledger mutations
//! - Event bus (typed intra-service communication)
//! - Service lifecycle trait

pub mod service;
pub mod event_bus;
pub mod inbound;
pub mod ledger;
pub mod badge;
pub mod deep_link;
pub mod center;

// Re-export key types
pub use service::{Service, ServiceState};
pub use event_bus::{AppEvent, EventBus};
pub use inbound::{DeliveryKind, InboundMessage, NotificationBlock};
pub use ledger::{IncomingNotification, NotificationLedger};
pub use badge::{compute_unread_count, BadgePublisher, BadgeSink, TracingBadgeSink};
pub use deep_link::{DeepLink, DeepLinkRouter, Navigator};
pub use center::{DeliveryHandler, NotificationCenter};
