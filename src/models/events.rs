use serde::{Deserialize, Serialize};

/// What triggered a quick action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuickActionType {
    Timer,
    Tray,
    Hotkey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuickActionOperation {
    Backup,
    Apply,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuickActionStatus {
    Success,
    Failure,
}

/// Payload of the backend's `quickActionCompleted` event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickActionCompleted {
    pub operation: QuickActionOperation,
    pub status: QuickActionStatus,
    pub trigger: QuickActionType,
    #[serde(default)]
    pub game_name: Option<String>,
}

impl QuickActionCompleted {
    /// A successful backup may have changed the document behind the UI's back.
    pub fn is_successful_backup(&self) -> bool {
        self.status == QuickActionStatus::Success && self.operation == QuickActionOperation::Backup
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
}

/// Payload of the backend's global `Notification` event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpcNotification {
    pub level: NotificationLevel,
    pub title: String,
    pub msg: String,
}

/// Events pushed by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload")]
pub enum BackendEvent {
    #[serde(rename = "quickActionCompleted")]
    QuickActionCompleted(QuickActionCompleted),
    Notification(IpcNotification),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_successful_backup_detection() {
        let mut event = QuickActionCompleted {
            operation: QuickActionOperation::Backup,
            status: QuickActionStatus::Success,
            trigger: QuickActionType::Hotkey,
            game_name: Some("Celeste".to_string()),
        };
        assert!(event.is_successful_backup());

        event.operation = QuickActionOperation::Apply;
        assert!(!event.is_successful_backup());

        event.operation = QuickActionOperation::Backup;
        event.status = QuickActionStatus::Failure;
        assert!(!event.is_successful_backup());
    }

    #[test]
    fn test_notification_payload_parses() {
        let json = r#"{"level":"warning","title":"WARNING","msg":"extra backup missing"}"#;
        let n: IpcNotification = serde_json::from_str(json).unwrap();
        assert_eq!(n.level, NotificationLevel::Warning);
        assert_eq!(n.msg, "extra backup missing");
    }
}
