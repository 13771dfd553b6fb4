//! Notification center: delivery handlers and the single ledger writer.
//!
//! Every ledger mutation (delivery, mark read, clear) runs under one async
//! write lock covering read-modify-write-refresh, so two deliveries racing
//! during an app-state transition cannot overwrite each other's update.
//! Readers use the snapshot cached by the last refresh.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::{Mutex as AsyncMutex, RwLock};
use tracing::{debug, info, warn};

use sc_core::config::NotificationConfig;
use sc_core::error::ScResult;
use sc_store::{KeyValueStore, NotificationRecord};

use crate::badge::{compute_unread_count, BadgePublisher, BadgeSink};
use crate::deep_link::{DeepLinkRouter, Navigator};
use crate::event_bus::{AppEvent, EventBus};
use crate::inbound::{DeliveryKind, InboundMessage};
use crate::ledger::{self, NotificationLedger};
use crate::service::{Service, ServiceState};

/// One entry point per delivery kind, driven by the messaging SDK adapter.
#[async_trait]
pub trait DeliveryHandler: Send + Sync {
    /// A message arrived while the app was active.
    async fn on_foreground_message(&self, message: InboundMessage);

    /// A message arrived while the app was in the background.
    async fn on_background_message(&self, message: InboundMessage);

    /// The user tapped a notification and the app returned from the background.
    async fn on_notification_opened(&self, message: InboundMessage);

    /// The app was launched from a terminated state, possibly by a tap.
    async fn on_initial_notification(&self, message: Option<InboundMessage>);
}

/// Owner of the notification ledger for the lifetime of the app.
pub struct NotificationCenter {
    state: Mutex<ServiceState>,
    ledger: NotificationLedger,
    badge: BadgePublisher,
    router: Arc<DeepLinkRouter>,
    event_bus: EventBus,
    settings: NotificationConfig,
    write_lock: AsyncMutex<()>,
    snapshot: RwLock<Vec<NotificationRecord>>,
}

impl NotificationCenter {
    /// Create a center over `store`, keeping the ledger under `ledger_key`.
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        ledger_key: &str,
        settings: NotificationConfig,
        event_bus: EventBus,
    ) -> Self {
        Self {
            state: Mutex::new(ServiceState::Created),
            ledger: NotificationLedger::new(store, ledger_key),
            badge: BadgePublisher::new(event_bus.clone()),
            router: Arc::new(DeepLinkRouter::new(event_bus.clone())),
            event_bus,
            settings,
            write_lock: AsyncMutex::new(()),
            snapshot: RwLock::new(Vec::new()),
        }
    }

    /// Attach the navigation collaborator used for deep links.
    pub fn with_navigator(self, navigator: Arc<dyn Navigator>) -> Self {
        self.router.set_navigator(navigator);
        self
    }

    /// Attach the platform badge API. May happen after startup.
    pub fn attach_badge_sink(&self, sink: Arc<dyn BadgeSink>) {
        self.badge.attach(sink);
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Router for URLs that arrive outside of push messages (cold-start URL,
    /// URL event stream).
    pub fn router(&self) -> Arc<DeepLinkRouter> {
        Arc::clone(&self.router)
    }

    pub fn ledger(&self) -> &NotificationLedger {
        &self.ledger
    }

    fn current_state(&self) -> ServiceState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set_state(&self, state: ServiceState) {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = state;
    }

    /// Stop accepting mutations. Usable through a shared reference.
    pub fn close(&self) {
        self.set_state(ServiceState::Stopped);
        self.badge.detach();
        info!("notification center stopped");
    }

    fn accepting(&self, what: &str) -> bool {
        let state = self.current_state();
        if state != ServiceState::Running {
            warn!("notification center is {state}, dropping {what}");
            return false;
        }
        true
    }

    /// Record one delivery event and refresh. Returns the stored record, or
    /// `None` when the event was dropped or the write failed.
    ///
    /// Tap deliveries also resolve the message's deep link once the ledger
    /// write is done.
    pub async fn deliver(
        &self,
        kind: DeliveryKind,
        message: InboundMessage,
    ) -> Option<NotificationRecord> {
        if !self.accepting(kind.as_str()) {
            return None;
        }

        let stored = {
            let _guard = self.write_lock.lock().await;
            // close() may have run while this call waited for the lock.
            if !self.accepting(kind.as_str()) {
                return None;
            }
            let now = chrono::Utc::now().timestamp_millis();
            let records = self.ledger.load();
            let id = match message.id() {
                Some(id) => id.to_string(),
                None => ledger::generate_id(&records, now),
            };
            debug!("{kind} delivery for {id}");

            let incoming = message.to_incoming(id.clone(), kind, &self.settings);
            let records = ledger::upsert(records, incoming, now);
            let stored = if self.ledger.save(&records) {
                records.into_iter().find(|r| r.id == id)
            } else {
                warn!("{kind} delivery for {id} was not stored");
                None
            };

            if let Some(record) = &stored {
                self.event_bus.emit(AppEvent::NotificationStored {
                    id: record.id.clone(),
                    kind,
                    read: record.read,
                });
            }

            self.refresh_locked().await;
            stored
        };

        if kind.opens_app() {
            self.router.open_from_data(&message.data, &self.settings.deep_link_key);
        }

        stored
    }

    /// Reload the ledger, replace the display snapshot, and republish the
    /// badge. Returns the unread count.
    pub async fn refresh(&self) -> usize {
        let _guard = self.write_lock.lock().await;
        self.refresh_locked().await
    }

    async fn refresh_locked(&self) -> usize {
        let mut records = self.ledger.load();
        ledger::sort_for_display(&mut records);
        let total = records.len();
        let unread = compute_unread_count(&records);
        *self.snapshot.write().await = records;

        self.badge.publish(unread);
        self.event_bus.emit(AppEvent::LedgerRefreshed { total, unread });
        unread
    }

    /// Flag every record as read. Returns the new unread count.
    pub async fn mark_all_read(&self) -> usize {
        if !self.accepting("mark_all_read") {
            return self.unread_count().await;
        }
        let _guard = self.write_lock.lock().await;
        if !self.accepting("mark_all_read") {
            return compute_unread_count(&self.snapshot.read().await);
        }
        let records = ledger::mark_all_read(self.ledger.load());
        if !self.ledger.save(&records) {
            warn!("mark_all_read was not stored");
        }
        self.refresh_locked().await
    }

    /// Flag one record as read. Returns whether the record exists and the
    /// change was stored.
    pub async fn mark_read(&self, id: &str) -> bool {
        if !self.accepting("mark_read") {
            return false;
        }
        let _guard = self.write_lock.lock().await;
        if !self.accepting("mark_read") {
            return false;
        }
        let (records, found) = ledger::mark_read(self.ledger.load(), id);
        let stored = if !found {
            debug!("mark_read: no record {id}");
            false
        } else if !self.ledger.save(&records) {
            warn!("mark_read for {id} was not stored");
            false
        } else {
            true
        };
        self.refresh_locked().await;
        stored
    }

    /// Drop the whole history. Returns whether anything was stored.
    pub async fn clear(&self) -> bool {
        if !self.accepting("clear") {
            return false;
        }
        let _guard = self.write_lock.lock().await;
        if !self.accepting("clear") {
            return false;
        }
        let removed = self.ledger.clear();
        self.refresh_locked().await;
        removed
    }

    /// Records from the last refresh, newest first.
    pub async fn records(&self) -> Vec<NotificationRecord> {
        self.snapshot.read().await.clone()
    }

    /// Unread count from the last refresh.
    pub async fn unread_count(&self) -> usize {
        compute_unread_count(&self.snapshot.read().await)
    }
}

#[async_trait]
impl DeliveryHandler for NotificationCenter {
    async fn on_foreground_message(&self, message: InboundMessage) {
        self.deliver(DeliveryKind::Foreground, message).await;
    }

    async fn on_background_message(&self, message: InboundMessage) {
        self.deliver(DeliveryKind::Background, message).await;
    }

    async fn on_notification_opened(&self, message: InboundMessage) {
        self.deliver(DeliveryKind::OpenedFromBackground, message).await;
    }

    async fn on_initial_notification(&self, message: Option<InboundMessage>) {
        match message {
            Some(message) => {
                self.deliver(DeliveryKind::OpenedFromTerminated, message).await;
            }
            None => debug!("app launched without a notification"),
        }
    }
}

impl Service for NotificationCenter {
    fn name(&self) -> &str {
        "notification_center"
    }

    fn state(&self) -> ServiceState {
        self.current_state()
    }

    fn init(&mut self) -> ScResult<()> {
        self.set_state(ServiceState::Running);
        info!("notification center initialized (ledger key: {})", self.ledger.key());
        Ok(())
    }

    fn shutdown(&mut self) -> ScResult<()> {
        self.close();
        Ok(())
    }
}
