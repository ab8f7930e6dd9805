use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A single notification as returned by `GET /notifications`.
///
/// The list endpoint only returns unread items, newest first. The backend
/// sends `createdAt` as a local datetime without an offset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationItem {
    pub id: i64,
    pub message: String,
    #[serde(rename = "isRead", default)]
    pub read: bool,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<NaiveDateTime>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_notification() {
        let json = r#"{
            "id": 42,
            "message": "Your meeting request was approved",
            "isRead": false,
            "createdAt": "2026-03-14T09:26:53.589"
        }"#;

        let item: NotificationItem = serde_json::from_str(json).expect("notification should parse");
        assert_eq!(item.id, 42);
        assert!(!item.read);
        assert!(item.created_at.is_some());
    }

    #[test]
    fn test_parse_notification_without_timestamp() {
        let json = r#"{"id": 1, "message": "hello"}"#;
        let item: NotificationItem = serde_json::from_str(json).expect("minimal notification should parse");
        assert!(!item.read);
        assert!(item.created_at.is_none());
    }
}
