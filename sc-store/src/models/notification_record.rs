//! Notification record model.
//!
//! The ledger persists a JSON array of these records. Field names on the
//! wire are exactly `id`, `title`, `body`, `timestamp`, `read`, `data`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sc_core::error::ScResult;

/// One notification as shown in the in-app history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRecord {
    /// Platform message id, or a generated timestamp-based id.
    pub id: String,
    pub title: String,
    pub body: String,
    /// Milliseconds since the Unix epoch. Only used for display ordering.
    pub timestamp: i64,
    pub read: bool,
    /// Auxiliary string payload from the platform (carries the deep link).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<HashMap<String, String>>,
}

impl NotificationRecord {
    /// Whether the record still counts towards the badge.
    pub fn is_unread(&self) -> bool {
        !self.read
    }

    /// Look up a value in the auxiliary payload.
    pub fn data_value(&self, key: &str) -> Option<&str> {
        self.data.as_ref()?.get(key).map(String::as_str)
    }

    /// Parse a serialized ledger.
    pub fn list_from_json(json: &str) -> ScResult<Vec<Self>> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize a ledger.
    pub fn list_to_json(records: &[Self]) -> ScResult<String> {
        Ok(serde_json::to_string(records)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, read: bool) -> NotificationRecord {
        NotificationRecord {
            id: id.into(),
            title: "Hi".into(),
            body: "There".into(),
            timestamp: 1_700_000_000_000,
            read,
            data: None,
        }
    }

    #[test]
    fn test_wire_field_names() {
        let mut rec = record("m1", false);
        rec.data = Some(HashMap::from([("link".to_string(), "spacechat://chat/1".to_string())]));
        let value = serde_json::to_value(&rec).unwrap();
        let obj = value.as_object().unwrap();
        let mut keys: Vec<&str> = obj.keys().map(String::as_str).collect();
        keys.sort();
        assert_eq!(keys, vec!["body", "data", "id", "read", "timestamp", "title"]);
        assert_eq!(rec.data_value("link"), Some("spacechat://chat/1"));
    }

    #[test]
    fn test_missing_data_is_omitted_and_accepted() {
        let json = NotificationRecord::list_to_json(&[record("m1", true)]).unwrap();
        assert!(!json.contains("data"));

        let parsed = NotificationRecord::list_from_json(
            r#"[{"id":"x","title":"t","body":"b","timestamp":5,"read":false}]"#,
        )
        .unwrap();
        assert_eq!(parsed.len(), 1);
        assert!(parsed[0].is_unread());
        assert_eq!(parsed[0].data_value("link"), None);
    }

    #[test]
    fn test_corrupt_list_is_error() {
        assert!(NotificationRecord::list_from_json("{\"id\":1}").is_err());
    }
}
