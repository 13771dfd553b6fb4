//! Inbound push messages and delivery classification.
//!
//! The messaging SDK hands the app a remote message with an optional
//! `notification` block, a string data map, and a message id. This module
//! normalizes that shape and turns it into the input of a ledger upsert.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use sc_core::config::NotificationConfig;
use sc_core::error::{ScError, ScResult};

use crate::ledger::IncomingNotification;

/// App-lifecycle state in which a push message reached the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryKind {
    /// Arrived while the app was active.
    Foreground,
    /// Arrived while the app was backgrounded but alive.
    Background,
    /// The user tapped it and the app came back from the background.
    OpenedFromBackground,
    /// The user tapped it and the app was launched from a terminated state.
    OpenedFromTerminated,
}

impl DeliveryKind {
    /// Value the record's `read` flag is forced to for this delivery.
    pub fn forced_read(&self) -> bool {
        self.opens_app()
    }

    /// Whether the delivery is a tap that opened the app (and so resolves
    /// the message's deep link).
    pub fn opens_app(&self) -> bool {
        matches!(self, Self::OpenedFromBackground | Self::OpenedFromTerminated)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Foreground => "foreground",
            Self::Background => "background",
            Self::OpenedFromBackground => "opened_from_background",
            Self::OpenedFromTerminated => "opened_from_terminated",
        }
    }
}

impl std::fmt::Display for DeliveryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display block of a remote message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationBlock {
    pub title: Option<String>,
    pub body: Option<String>,
}

/// A remote message as delivered by the messaging SDK, normalized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InboundMessage {
    pub message_id: Option<String>,
    pub notification: Option<NotificationBlock>,
    pub data: HashMap<String, String>,
}

/// Wire shape accepted by `InboundMessage::from_json`.
#[derive(Deserialize)]
struct RawRemoteMessage {
    #[serde(rename = "messageId", alias = "message_id", default)]
    message_id: Option<String>,
    #[serde(default)]
    notification: Option<NotificationBlock>,
    #[serde(default)]
    data: Option<HashMap<String, Value>>,
}

impl InboundMessage {
    /// Create an empty message with the given platform id.
    pub fn new(message_id: Option<String>) -> Self {
        Self {
            message_id,
            ..Self::default()
        }
    }

    /// Attach a notification block.
    pub fn with_notification(mut self, title: Option<String>, body: Option<String>) -> Self {
        self.notification = Some(NotificationBlock { title, body });
        self
    }

    /// Add one entry to the data payload.
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Parse the SDK's remote-message JSON
    /// (`{"messageId", "notification": {"title", "body"}, "data": {...}}`).
    ///
    /// Non-string data values are kept in their JSON text form.
    pub fn from_json(value: &Value) -> ScResult<Self> {
        if !value.is_object() {
            return Err(ScError::InvalidPayload("remote message must be a JSON object".into()));
        }
        let raw: RawRemoteMessage = serde_json::from_value(value.clone())
            .map_err(|e| ScError::InvalidPayload(e.to_string()))?;

        let data = raw
            .data
            .unwrap_or_default()
            .into_iter()
            .map(|(k, v)| {
                let v = match v {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                (k, v)
            })
            .collect();

        Ok(Self {
            message_id: raw.message_id,
            notification: raw.notification,
            data,
        })
    }

    /// The platform id, if present and non-empty.
    pub fn id(&self) -> Option<&str> {
        self.message_id.as_deref().filter(|id| !id.trim().is_empty())
    }

    /// Title: notification block, then `data.title`, then the default.
    pub fn title_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.display_field(|n| n.title.as_deref(), "title").unwrap_or(default)
    }

    /// Body: notification block, then `data.body`, then the default.
    pub fn body_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.display_field(|n| n.body.as_deref(), "body").unwrap_or(default)
    }

    fn display_field<'a>(
        &'a self,
        from_block: impl Fn(&'a NotificationBlock) -> Option<&'a str>,
        data_key: &str,
    ) -> Option<&'a str> {
        self.notification
            .as_ref()
            .and_then(from_block)
            .filter(|s| !s.is_empty())
            .or_else(|| self.data.get(data_key).map(String::as_str).filter(|s| !s.is_empty()))
    }

    /// Build the ledger upsert input for this message.
    ///
    /// `id` is the resolved record id (the platform id or a generated one).
    pub fn to_incoming(
        &self,
        id: String,
        kind: DeliveryKind,
        defaults: &NotificationConfig,
    ) -> IncomingNotification {
        IncomingNotification {
            id,
            title: self.title_or(&defaults.default_title).to_string(),
            body: self.body_or(&defaults.default_body).to_string(),
            data: if self.data.is_empty() { None } else { Some(self.data.clone()) },
            read: kind.forced_read(),
        }
    }
}
