//! Typed event bus for intra-service communication.
//!
//! Uses tokio broadcast channels so the ledger, badge, and deep-link pieces
//! can report what they did without knowing who is listening (UI adapters,
//! the CLI, tests).

use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

use crate::inbound::DeliveryKind;

/// Application-level events emitted by the notification services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// A delivery event was written to the ledger.
    NotificationStored {
        id: String,
        kind: DeliveryKind,
        read: bool,
    },
    /// The ledger was reloaded and the display snapshot replaced.
    LedgerRefreshed {
        total: usize,
        unread: usize,
    },
    /// The unread count was handed to the platform badge API.
    BadgeUpdated {
        count: usize,
    },
    /// A deep link was resolved and handed to the navigator.
    DeepLinkOpened {
        screen: String,
        params: Option<String>,
    },
}

/// Application-wide event bus backed by a tokio broadcast channel.
///
/// Every subscriber gets every event. Slow subscribers that fall behind
/// receive a `Lagged` error and miss events.
#[derive(Clone)]
pub struct EventBus {
    sender: Arc<broadcast::Sender<AppEvent>>,
}

impl EventBus {
    /// Create a new EventBus with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Subscribe to receive application events.
    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.sender.subscribe()
    }

    /// Emit an event to all subscribers.
    pub fn emit(&self, event: AppEvent) {
        let label = event_label(&event);
        match self.sender.send(event) {
            Ok(count) => {
                debug!("event_bus: emitted {label} to {count} subscriber(s)");
            }
            Err(_) => {
                debug!("event_bus: no subscribers for {label}");
            }
        }
    }

    /// Get the current number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

fn event_label(event: &AppEvent) -> &'static str {
    match event {
        AppEvent::NotificationStored { .. } => "NotificationStored",
        AppEvent::LedgerRefreshed { .. } => "LedgerRefreshed",
        AppEvent::BadgeUpdated { .. } => "BadgeUpdated",
        AppEvent::DeepLinkOpened { .. } => "DeepLinkOpened",
    }
}
