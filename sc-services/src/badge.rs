//! Unread badge projection.
//!
//! The badge is derived, never stored: it is recomputed from the ledger on
//! every refresh and pushed to whatever icon-badge API the host attached.

use std::sync::{Arc, RwLock};

use tracing::{debug, info, warn};

use sc_core::error::ScResult;
use sc_store::NotificationRecord;

use crate::event_bus::{AppEvent, EventBus};

/// Number of records not yet read.
pub fn compute_unread_count(records: &[NotificationRecord]) -> usize {
    records.iter().filter(|r| r.is_unread()).count()
}

/// The platform's application icon badge API.
pub trait BadgeSink: Send + Sync {
    fn set_badge_count(&self, count: usize) -> ScResult<()>;
}

/// Sink for hosts without an icon badge: records the count in the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingBadgeSink;

impl BadgeSink for TracingBadgeSink {
    fn set_badge_count(&self, count: usize) -> ScResult<()> {
        info!(count, "badge count");
        Ok(())
    }
}

/// Forwards unread counts to the attached `BadgeSink`.
///
/// Until a sink is attached the platform API counts as not initialized and
/// publishing is skipped. Failures are logged and never retried.
pub struct BadgePublisher {
    sink: RwLock<Option<Arc<dyn BadgeSink>>>,
    event_bus: EventBus,
}

impl BadgePublisher {
    pub fn new(event_bus: EventBus) -> Self {
        Self {
            sink: RwLock::new(None),
            event_bus,
        }
    }

    /// Attach (or replace) the platform badge API.
    pub fn attach(&self, sink: Arc<dyn BadgeSink>) {
        *self.sink.write().unwrap_or_else(|e| e.into_inner()) = Some(sink);
        debug!("badge sink attached");
    }

    /// Detach the platform badge API, e.g. while the host tears down.
    pub fn detach(&self) {
        *self.sink.write().unwrap_or_else(|e| e.into_inner()) = None;
        debug!("badge sink detached");
    }

    /// Whether a sink is attached.
    pub fn is_available(&self) -> bool {
        self.sink.read().unwrap_or_else(|e| e.into_inner()).is_some()
    }

    /// Push `count` to the badge. Returns whether the sink accepted it.
    pub fn publish(&self, count: usize) -> bool {
        let sink = self.sink.read().unwrap_or_else(|e| e.into_inner()).clone();
        let Some(sink) = sink else {
            warn!("badge API not initialized, skipping badge update ({count})");
            return false;
        };

        match sink.set_badge_count(count) {
            Ok(()) => {
                self.event_bus.emit(AppEvent::BadgeUpdated { count });
                true
            }
            Err(e) => {
                warn!("failed to set badge count {count}: {e}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sc_core::error::ScError;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        counts: Mutex<Vec<usize>>,
    }

    impl BadgeSink for RecordingSink {
        fn set_badge_count(&self, count: usize) -> ScResult<()> {
            self.counts.lock().unwrap().push(count);
            Ok(())
        }
    }

    struct BrokenSink;

    impl BadgeSink for BrokenSink {
        fn set_badge_count(&self, _count: usize) -> ScResult<()> {
            Err(ScError::Badge("launcher does not support badges".into()))
        }
    }

    fn record(id: &str, read: bool) -> NotificationRecord {
        NotificationRecord {
            id: id.into(),
            title: String::new(),
            body: String::new(),
            timestamp: 0,
            read,
            data: None,
        }
    }

    #[test]
    fn test_compute_unread_count() {
        assert_eq!(compute_unread_count(&[]), 0);
        let records = vec![record("a", false), record("b", true), record("c", false)];
        assert_eq!(compute_unread_count(&records), 2);
    }

    #[test]
    fn test_publish_without_sink_is_skipped() {
        let publisher = BadgePublisher::new(EventBus::new(4));
        assert!(!publisher.is_available());
        assert!(!publisher.publish(3));
    }

    #[tokio::test]
    async fn test_publish_forwards_and_emits() {
        let bus = EventBus::new(4);
        let mut rx = bus.subscribe();
        let publisher = BadgePublisher::new(bus);
        let sink = Arc::new(RecordingSink::default());
        publisher.attach(sink.clone());

        assert!(publisher.publish(2));
        assert!(publisher.publish(0));
        assert_eq!(*sink.counts.lock().unwrap(), vec![2, 0]);
        assert_eq!(rx.recv().await.unwrap(), AppEvent::BadgeUpdated { count: 2 });
    }

    #[test]
    fn test_publish_failure_is_soft() {
        let publisher = BadgePublisher::new(EventBus::new(4));
        publisher.attach(Arc::new(BrokenSink));
        assert!(!publisher.publish(1));
    }

    #[test]
    fn test_detach() {
        let publisher = BadgePublisher::new(EventBus::new(4));
        publisher.attach(Arc::new(TracingBadgeSink));
        assert!(publisher.publish(1));
        publisher.detach();
        assert!(!publisher.publish(1));
    }
}
