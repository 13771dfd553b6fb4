//! Open command: resolve a deep link and hand it to the terminal navigator.

use std::sync::Arc;

use sc_core::config::ConfigHandle;
use sc_core::error::{ScError, ScResult};
use sc_services::{DeepLinkRouter, EventBus};
use crate::OutputFormat;

pub async fn run(config: ConfigHandle, url: &str, format: OutputFormat) -> ScResult<()> {
    let capacity = config.read().await.event_bus.capacity;
    let router = DeepLinkRouter::new(EventBus::new(capacity))
        .with_navigator(Arc::new(super::TerminalNavigator::new(format)));

    let link = router
        .open_initial_url(Some(url))
        .ok_or_else(|| ScError::InvalidDeepLink(url.to_string()))?;

    if format == OutputFormat::Json {
        let json = serde_json::json!({
            "scheme": link.scheme,
            "screen": link.screen,
            "params": link.params,
            "query": link.query,
        });
        println!("{json}");
    }
    Ok(())
}
