//! Replay command: drive a recorded session through one notification center.
//!
//! Each line of the input is a JSON object, either a delivery
//! `{"kind": "background", "message": {...}}` (omit `message` on an
//! `opened_from_terminated` line for a launch without a notification) or an
//! opened URL `{"url": "spacechat://chat/1"}`. Lines are handled strictly
//! in file order, so the printed event log follows the file.

use std::path::PathBuf;

use console::style;
use serde::Deserialize;
use tokio::sync::broadcast;
use tracing::warn;

use sc_core::config::ConfigHandle;
use sc_core::error::{ScError, ScResult};
use sc_services::{AppEvent, DeliveryHandler, DeliveryKind, InboundMessage, NotificationCenter};
use crate::OutputFormat;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ReplayLine {
    Delivery {
        kind: DeliveryKind,
        #[serde(default)]
        message: Option<serde_json::Value>,
    },
    Url {
        url: String,
    },
}

fn parse_lines(contents: &str) -> ScResult<Vec<ReplayLine>> {
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty() && !line.trim_start().starts_with('#'))
        .map(|(n, line)| {
            serde_json::from_str(line)
                .map_err(|e| ScError::InvalidPayload(format!("line {}: {e}", n + 1)))
        })
        .collect()
}

/// Feed `lines` through `center` in order and collect the events emitted.
async fn play(center: &NotificationCenter, lines: Vec<ReplayLine>) -> ScResult<Vec<AppEvent>> {
    let mut events = center.event_bus().subscribe();
    let router = center.router();

    for line in lines {
        match line {
            ReplayLine::Delivery { kind, message } => {
                let message = message.as_ref().map(InboundMessage::from_json).transpose()?;
                match (kind, message) {
                    (DeliveryKind::OpenedFromTerminated, message) => {
                        center.on_initial_notification(message).await;
                    }
                    (kind, Some(message)) => {
                        center.deliver(kind, message).await;
                    }
                    (kind, None) => warn!("skipping {kind} line without a message"),
                }
            }
            ReplayLine::Url { url } => {
                router.open_url(&url);
            }
        }
    }

    let mut log = Vec::new();
    loop {
        match events.try_recv() {
            Ok(event) => log.push(event),
            Err(broadcast::error::TryRecvError::Lagged(n)) => warn!("missed {n} events"),
            Err(_) => break,
        }
    }
    Ok(log)
}

pub async fn run(
    config: ConfigHandle,
    path: PathBuf,
    ephemeral: bool,
    format: OutputFormat,
) -> ScResult<()> {
    let lines = parse_lines(&std::fs::read_to_string(&path)?)?;

    let center = super::start_center(&config, ephemeral, format).await?;
    let log = play(&center, lines).await?;

    let unread = center.unread_count().await;
    let total = center.records().await.len();

    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "events": log.iter().map(event_json).collect::<Vec<_>>(),
                "total": total,
                "unread_count": unread,
            });
            println!("{}", serde_json::to_string_pretty(&json).unwrap_or_default());
        }
        OutputFormat::Text => {
            for event in &log {
                println!("{}", describe(event));
            }
            println!("{total} notification(s), {} unread", style(unread).bold());
        }
    }
    Ok(())
}

fn describe(event: &AppEvent) -> String {
    match event {
        AppEvent::NotificationStored { id, kind, read } => {
            let state = if *read { "read" } else { "unread" };
            format!("{} {id} ({kind}, {state})", style("stored").green())
        }
        AppEvent::LedgerRefreshed { total, unread } => {
            format!("{} {total} total, {unread} unread", style("refreshed").dim())
        }
        AppEvent::BadgeUpdated { count } => format!("{} {count}", style("badge").yellow()),
        AppEvent::DeepLinkOpened { screen, params } => match params {
            Some(params) => format!("{} {screen} ({params})", style("opened").cyan()),
            None => format!("{} {screen}", style("opened").cyan()),
        },
    }
}

fn event_json(event: &AppEvent) -> serde_json::Value {
    match event {
        AppEvent::NotificationStored { id, kind, read } => {
            serde_json::json!({ "event": "notification_stored", "id": id, "kind": kind, "read": read })
        }
        AppEvent::LedgerRefreshed { total, unread } => {
            serde_json::json!({ "event": "ledger_refreshed", "total": total, "unread": unread })
        }
        AppEvent::BadgeUpdated { count } => {
            serde_json::json!({ "event": "badge_updated", "count": count })
        }
        AppEvent::DeepLinkOpened { screen, params } => {
            serde_json::json!({ "event": "deep_link_opened", "screen": screen, "params": params })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sc_core::config::AppConfig;

    const SESSION: &str = r#"
# launch, one push in each state, then a URL
{"kind": "foreground", "message": {"messageId": "m1", "notification": {"title": "Hi", "body": "There"}}}
{"kind": "background", "message": {"messageId": "m2", "data": {"title": "Ping"}}}
{"kind": "opened_from_background", "message": {"messageId": "m2", "data": {"link": "spacechat://chat/2"}}}
{"kind": "opened_from_terminated"}
{"url": "spacechat://profile"}
"#;

    #[test]
    fn test_parse_lines() {
        let lines = parse_lines(SESSION).unwrap();
        assert_eq!(lines.len(), 5);
        assert!(matches!(
            lines[3],
            ReplayLine::Delivery { kind: DeliveryKind::OpenedFromTerminated, message: None }
        ));
        assert!(matches!(&lines[4], ReplayLine::Url { url } if url == "spacechat://profile"));
    }

    #[test]
    fn test_parse_lines_reports_line_number() {
        let err = parse_lines("{\"url\": \"a://b\"}\nnot json").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[tokio::test]
    async fn test_replay_ephemeral_session() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("session.jsonl");
        std::fs::write(&path, SESSION).unwrap();

        let handle = ConfigHandle::new(AppConfig::default());
        run(handle, path, true, OutputFormat::Json).await.unwrap();
    }

    #[tokio::test]
    async fn test_event_log_follows_file_order() {
        let session = r#"
{"kind": "foreground", "message": {"messageId": "a", "notification": {"title": "A", "body": "a"}}}
{"url": "spacechat://profile"}
{"kind": "background", "message": {"messageId": "b", "notification": {"title": "B", "body": "b"}}}
{"url": "spacechat://chat/9"}
"#;
        let handle = ConfigHandle::new(AppConfig::default());
        let center = crate::commands::start_center(&handle, true, OutputFormat::Json)
            .await
            .unwrap();

        let log = play(&center, parse_lines(session).unwrap()).await.unwrap();
        let order: Vec<String> = log
            .iter()
            .filter_map(|e| match e {
                AppEvent::NotificationStored { id, .. } => Some(id.clone()),
                AppEvent::DeepLinkOpened { screen, .. } => Some(screen.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(order, vec!["a", "profile", "b", "chat"]);
    }
}
