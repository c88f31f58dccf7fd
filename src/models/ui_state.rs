use std::time::{Duration, Instant};

/// Identifier assigned to every queued notification
pub type NotificationId = String;

/// Kind of a user-facing notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    Success,
    Info,
    Warning,
    Error,
}

impl NotificationKind {
    /// Catalog key of the default title for this kind.
    pub fn title_key(self) -> &'static str {
        match self {
            NotificationKind::Success => "notification.success_title",
            NotificationKind::Info => "notification.info_title",
            NotificationKind::Warning => "notification.warning_title",
            NotificationKind::Error => "notification.error_title",
        }
    }
}

/// A notification as handed to the renderer.
///
/// `duration` of zero means the toast stays until closed.
#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub id: NotificationId,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub duration: Duration,
    pub queued_at: Instant,
}

impl Toast {
    pub fn is_persistent(&self) -> bool {
        self.duration.is_zero()
    }
}

/// One pending busy scope on the loading stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadingEntry {
    pub id: u64,
    pub message: Option<String>,
}

/// UI-facing state shared between the services.
///
/// Wrapped in `Arc<RwLock<UiState>>` by [`crate::state::StateManager`]; mutate it
/// only through [`StateManager::update`](crate::state::StateManager::update) so
/// change events are emitted.
#[derive(Clone, Debug, Default)]
pub struct UiState {
    // Loading stack, most recent scope last
    pub loading_entries: Vec<LoadingEntry>,

    // Config store
    pub config_loading: bool,
    pub config_revision: u64,

    // Toasts currently rendered, in display order
    pub visible_toasts: Vec<Toast>,
}

impl UiState {
    pub fn is_loading(&self) -> bool {
        !self.loading_entries.is_empty()
    }

    /// Message of the most recently started pending scope.
    ///
    /// Returns `None` when nothing is loading, `Some(None)` when the top scope
    /// carries no message of its own.
    pub fn top_loading_message(&self) -> Option<Option<&str>> {
        self.loading_entries.last().map(|e| e.message.as_deref())
    }

    pub fn is_toast_visible(&self, id: &str) -> bool {
        self.visible_toasts.iter().any(|t| t.id == id)
    }
}
