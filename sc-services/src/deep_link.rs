//! Deep-link parsing and routing.
//!
//! A deep link is a `scheme://screen/params?query#fragment` URL. The first
//! segment after the scheme names the destination screen; the rest of the
//! path is passed through to the navigator as an opaque parameter string.
//! The query is kept on the parsed link and the fragment is dropped.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use lazy_static::lazy_static;
use regex::Regex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use sc_core::constants::DEEP_LINK_SCHEME;
use sc_core::error::ScResult;

use crate::event_bus::{AppEvent, EventBus};

lazy_static! {
    // scheme "://" screen [ "/" params ] [ "?" query ] [ "#" fragment ]
    static ref DEEP_LINK: Regex = Regex::new(
        r"^([A-Za-z][A-Za-z0-9+.\-]*)://([^/?#]+)(?:/([^?#]*))?(?:\?([^#]*))?(?:#.*)?$"
    ).unwrap();
}

/// A parsed deep link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeepLink {
    pub scheme: String,
    pub screen: String,
    pub params: Option<String>,
    /// Query string without the leading `?`.
    pub query: Option<String>,
}

impl DeepLink {
    /// Parse `url`. Returns `None` when there is no scheme or no screen.
    pub fn parse(url: &str) -> Option<Self> {
        let caps = DEEP_LINK.captures(url.trim())?;
        let params = caps
            .get(3)
            .map(|m| m.as_str().trim_end_matches('/'))
            .filter(|p| !p.is_empty())
            .map(str::to_owned);
        let query = caps
            .get(4)
            .map(|m| m.as_str())
            .filter(|q| !q.is_empty())
            .map(str::to_owned);

        Some(Self {
            scheme: caps[1].to_ascii_lowercase(),
            screen: caps[2].to_string(),
            params,
            query,
        })
    }
}

/// Read the deep link out of a message's data payload.
pub fn deep_link_from_data(data: &HashMap<String, String>, key: &str) -> Option<DeepLink> {
    data.get(key).and_then(|url| DeepLink::parse(url))
}

/// In-app navigation collaborator.
pub trait Navigator: Send + Sync {
    fn navigate(&self, screen: &str, params: Option<&str>) -> ScResult<()>;
}

/// Resolves URLs into deep links and hands them to the navigator.
pub struct DeepLinkRouter {
    navigator: RwLock<Option<Arc<dyn Navigator>>>,
    event_bus: EventBus,
}

impl DeepLinkRouter {
    pub fn new(event_bus: EventBus) -> Self {
        Self {
            navigator: RwLock::new(None),
            event_bus,
        }
    }

    pub fn with_navigator(self, navigator: Arc<dyn Navigator>) -> Self {
        self.set_navigator(navigator);
        self
    }

    /// Attach (or replace) the navigation collaborator.
    pub fn set_navigator(&self, navigator: Arc<dyn Navigator>) {
        *self.navigator.write().unwrap_or_else(|e| e.into_inner()) = Some(navigator);
    }

    /// Resolve and open `url`. Returns the link when navigation happened.
    pub fn open_url(&self, url: &str) -> Option<DeepLink> {
        let Some(link) = DeepLink::parse(url) else {
            warn!("ignoring unparseable deep link: {url}");
            return None;
        };
        self.open(link)
    }

    /// Open a message's deep link, if its data carries one under `key`.
    pub fn open_from_data(&self, data: &HashMap<String, String>, key: &str) -> Option<DeepLink> {
        match data.get(key) {
            Some(url) => self.open_url(url),
            None => {
                debug!("message carries no deep link under '{key}'");
                None
            }
        }
    }

    /// Handle the URL the app was cold-started with, if any.
    pub fn open_initial_url(&self, url: Option<&str>) -> Option<DeepLink> {
        match url {
            Some(url) => {
                info!("app launched with deep link {url}");
                self.open_url(url)
            }
            None => None,
        }
    }

    /// Follow a stream of opened URLs until the sender side closes.
    pub fn listen(self: Arc<Self>, mut urls: mpsc::Receiver<String>) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(url) = urls.recv().await {
                self.open_url(&url);
            }
            debug!("deep link stream closed");
        })
    }

    fn open(&self, link: DeepLink) -> Option<DeepLink> {
        if link.scheme != DEEP_LINK_SCHEME {
            debug!("deep link uses foreign scheme {}", link.scheme);
        }
        let navigator = self.navigator.read().unwrap_or_else(|e| e.into_inner()).clone();
        let Some(navigator) = navigator else {
            warn!("no navigator attached, dropping deep link to {}", link.screen);
            return None;
        };

        if let Err(e) = navigator.navigate(&link.screen, link.params.as_deref()) {
            warn!("navigation to {} failed: {e}", link.screen);
            return None;
        }

        info!("navigated to {} ({:?})", link.screen, link.params);
        self.event_bus.emit(AppEvent::DeepLinkOpened {
            screen: link.screen.clone(),
            params: link.params.clone(),
        });
        Some(link)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sc_core::error::ScError;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingNavigator {
        visits: Mutex<Vec<(String, Option<String>)>>,
    }

    impl Navigator for RecordingNavigator {
        fn navigate(&self, screen: &str, params: Option<&str>) -> ScResult<()> {
            if screen == "forbidden" {
                return Err(ScError::Navigation("no such screen".into()));
            }
            self.visits
                .lock()
                .unwrap()
                .push((screen.to_string(), params.map(str::to_owned)));
            Ok(())
        }
    }

    fn router() -> (DeepLinkRouter, Arc<RecordingNavigator>) {
        let nav = Arc::new(RecordingNavigator::default());
        (DeepLinkRouter::new(EventBus::new(8)).with_navigator(nav.clone()), nav)
    }

    #[test]
    fn test_parse_screen_and_params() {
        let link = DeepLink::parse("spacechat://chat/42").unwrap();
        assert_eq!(link.scheme, "spacechat");
        assert_eq!(link.screen, "chat");
        assert_eq!(link.params.as_deref(), Some("42"));
    }

    #[test]
    fn test_parse_screen_only() {
        let link = DeepLink::parse("SpaceChat://profile/").unwrap();
        assert_eq!(link.scheme, "spacechat");
        assert_eq!(link.screen, "profile");
        assert_eq!(link.params, None);
    }

    #[test]
    fn test_parse_nested_params_kept_whole() {
        let link = DeepLink::parse("spacechat://thread/7/message/3").unwrap();
        assert_eq!(link.screen, "thread");
        assert_eq!(link.params.as_deref(), Some("7/message/3"));
    }

    #[test]
    fn test_parse_query_after_screen() {
        let link = DeepLink::parse("spacechat://chat?room=5").unwrap();
        assert_eq!(link.screen, "chat");
        assert_eq!(link.params, None);
        assert_eq!(link.query.as_deref(), Some("room=5"));

        let link = DeepLink::parse("spacechat://chat#top").unwrap();
        assert_eq!(link.screen, "chat");
        assert_eq!(link.params, None);
        assert_eq!(link.query, None);
    }

    #[test]
    fn test_parse_query_after_params() {
        let link = DeepLink::parse("spacechat://chat/42?x=1#last").unwrap();
        assert_eq!(link.screen, "chat");
        assert_eq!(link.params.as_deref(), Some("42"));
        assert_eq!(link.query.as_deref(), Some("x=1"));

        let link = DeepLink::parse("spacechat://chat/42/?").unwrap();
        assert_eq!(link.params.as_deref(), Some("42"));
        assert_eq!(link.query, None);
    }

    #[test]
    fn test_query_link_navigates() {
        let (router, nav) = router();
        assert!(router.open_url("spacechat://chat?room=5").is_some());
        assert_eq!(*nav.visits.lock().unwrap(), vec![("chat".to_string(), None)]);
    }

    #[test]
    fn test_navigator_attached_later() {
        let router = DeepLinkRouter::new(EventBus::new(8));
        assert!(router.open_url("spacechat://chat/1").is_none());

        let nav = Arc::new(RecordingNavigator::default());
        router.set_navigator(nav.clone());
        assert!(router.open_url("spacechat://chat/1").is_some());
        assert_eq!(nav.visits.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(DeepLink::parse("not a url"), None);
        assert_eq!(DeepLink::parse("spacechat://"), None);
        assert_eq!(DeepLink::parse("/chat/42"), None);
    }

    #[test]
    fn test_deep_link_from_data() {
        let data = HashMap::from([("link".to_string(), "spacechat://home".to_string())]);
        assert_eq!(deep_link_from_data(&data, "link").unwrap().screen, "home");
        assert_eq!(deep_link_from_data(&data, "url"), None);
    }

    #[test]
    fn test_open_url_navigates() {
        let (router, nav) = router();
        assert!(router.open_url("spacechat://chat/1").is_some());
        assert!(router.open_url("junk").is_none());
        assert!(router.open_url("spacechat://forbidden").is_none());
        assert_eq!(
            *nav.visits.lock().unwrap(),
            vec![("chat".to_string(), Some("1".to_string()))]
        );
    }

    #[test]
    fn test_without_navigator_is_soft() {
        let router = DeepLinkRouter::new(EventBus::new(8));
        assert!(router.open_url("spacechat://chat/1").is_none());
    }

    #[test]
    fn test_initial_url() {
        let (router, nav) = router();
        assert!(router.open_initial_url(None).is_none());
        assert!(router.open_initial_url(Some("spacechat://settings")).is_some());
        assert_eq!(nav.visits.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_listen_follows_stream() {
        let bus = EventBus::new(8);
        let mut events = bus.subscribe();
        let nav = Arc::new(RecordingNavigator::default());
        let router = Arc::new(DeepLinkRouter::new(bus).with_navigator(nav.clone()));

        let (tx, rx) = mpsc::channel(4);
        let handle = router.listen(rx);
        tx.send("spacechat://chat/9".to_string()).await.unwrap();
        tx.send("bogus".to_string()).await.unwrap();
        drop(tx);
        handle.await.unwrap();

        assert_eq!(nav.visits.lock().unwrap().len(), 1);
        assert_eq!(
            events.recv().await.unwrap(),
            AppEvent::DeepLinkOpened {
                screen: "chat".into(),
                params: Some("9".into()),
            }
        );
    }
}
