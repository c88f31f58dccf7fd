// State management module
//
// This module provides the StateManager which wraps UiState with thread-safe access
// using Arc<RwLock<T>> and emits change events for UI updates.

use crate::models::{LoadingEntry, Toast, UiState};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::broadcast;

/// Change events emitted when state is modified
///
/// These events are emitted to notify interested parties (primarily the renderer)
/// about state changes without requiring them to poll the state.
#[derive(Clone, Debug, PartialEq)]
pub enum StateChange {
    /// The loading stack changed its top entry or emptiness
    LoadingChanged {
        is_loading: bool,
        message: Option<String>,
    },

    /// The config store started or finished a refresh
    ConfigLoadingChanged {
        loading: bool,
    },

    /// The configuration document was replaced
    ConfigReplaced {
        revision: u64,
    },

    /// A toast was rendered
    ToastShown {
        id: String,
    },

    /// A toast was dismissed or closed
    ToastClosed {
        id: String,
    },
}

/// Thread-safe state manager with event emission
///
/// This is the central UI state component that:
/// - Provides thread-safe access to [`UiState`] via `Arc<RwLock<T>>`
/// - Detects state changes and emits [`StateChange`] events
/// - Supports subscribing to state changes via tokio broadcast channels
///
/// # Usage
///
/// Always use `StateManager` instead of accessing [`UiState`] directly:
/// - [`read()`](Self::read) for reading state
/// - [`update()`](Self::update) for mutations with automatic event emission
/// - [`subscribe()`](Self::subscribe) for listening to state changes
///
/// # Related Types
///
/// - [`crate::services::loading::LoadingStack`]: drives the loading entries
/// - [`crate::services::notification::NotificationQueue`]: drives visible toasts
/// - [`crate::config::ConfigStore`]: drives the config flags
pub struct StateManager {
    /// The UI state protected by RwLock for thread-safe access
    state: Arc<RwLock<UiState>>,

    /// Broadcast channel for emitting state change events
    state_tx: broadcast::Sender<StateChange>,
}

impl StateManager {
    /// Create a new StateManager with default state
    ///
    /// # Returns
    /// A new StateManager with a broadcast channel buffer of 100 events
    pub fn new() -> Self {
        let (state_tx, _) = broadcast::channel(100);
        Self {
            state: Arc::new(RwLock::new(UiState::default())),
            state_tx,
        }
    }

    fn read_lock(&self) -> RwLockReadGuard<'_, UiState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_lock(&self) -> RwLockWriteGuard<'_, UiState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Get a copy of the current state that is safe to hold without locks
    pub fn snapshot(&self) -> UiState {
        self.read_lock().clone()
    }

    /// Execute a function with read access to the state
    ///
    /// # Example
    /// ```ignore
    /// let busy = state_manager.read(|state| state.is_loading());
    /// ```
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&UiState) -> R,
    {
        let state = self.read_lock();
        f(&state)
    }

    /// Update the state and emit change events
    ///
    /// This is the primary way to modify state. It:
    /// 1. Captures the old state
    /// 2. Applies the update function
    /// 3. Detects what changed
    /// 4. Emits appropriate events
    ///
    /// # Returns
    /// The closure's result together with the emitted events
    pub fn update<F, R>(&self, update_fn: F) -> (R, Vec<StateChange>)
    where
        F: FnOnce(&mut UiState) -> R,
    {
        let mut state = self.write_lock();
        let old_state = state.clone();

        let result = update_fn(&mut state);

        let changes = Self::detect_changes(&old_state, &state);
        drop(state);

        for change in &changes {
            // Ignore send errors - it's OK if no one is listening
            let _ = self.state_tx.send(change.clone());
        }

        (result, changes)
    }

    /// Subscribe to state change events
    ///
    /// Returns a receiver that will get notified of all future state changes.
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.state_tx.subscribe()
    }

    /// Detect what changed between two states and generate events
    fn detect_changes(old: &UiState, new: &UiState) -> Vec<StateChange> {
        let mut changes = Vec::new();

        if old.is_loading() != new.is_loading()
            || old.top_loading_message() != new.top_loading_message()
        {
            changes.push(StateChange::LoadingChanged {
                is_loading: new.is_loading(),
                message: new.top_loading_message().flatten().map(str::to_string),
            });
        }

        if old.config_loading != new.config_loading {
            changes.push(StateChange::ConfigLoadingChanged {
                loading: new.config_loading,
            });
        }

        if old.config_revision != new.config_revision {
            changes.push(StateChange::ConfigReplaced {
                revision: new.config_revision,
            });
        }

        for toast in &new.visible_toasts {
            if !old.is_toast_visible(&toast.id) {
                changes.push(StateChange::ToastShown {
                    id: toast.id.clone(),
                });
            }
        }

        for toast in &old.visible_toasts {
            if !new.is_toast_visible(&toast.id) {
                changes.push(StateChange::ToastClosed {
                    id: toast.id.clone(),
                });
            }
        }

        changes
    }

    // Convenience methods for common state updates

    /// Push a scope onto the loading stack
    pub fn push_loading(&self, entry: LoadingEntry) -> Vec<StateChange> {
        self.update(|state| state.loading_entries.push(entry)).1
    }

    /// Remove a specific scope from the loading stack, wherever it sits
    ///
    /// Returns `true` if the entry was still present.
    pub fn remove_loading(&self, id: u64) -> bool {
        self.update(|state| {
            let before = state.loading_entries.len();
            state.loading_entries.retain(|e| e.id != id);
            before != state.loading_entries.len()
        })
        .0
    }

    /// Pop the most recent scope from the loading stack
    pub fn pop_loading(&self) -> Option<LoadingEntry> {
        self.update(|state| state.loading_entries.pop()).0
    }

    /// Set the config store's loading flag
    pub fn set_config_loading(&self, loading: bool) -> Vec<StateChange> {
        self.update(|state| state.config_loading = loading).1
    }

    /// Record that the configuration document was replaced
    pub fn bump_config_revision(&self) -> u64 {
        self.update(|state| {
            state.config_revision += 1;
            state.config_revision
        })
        .0
    }

    /// Add a toast to the visible set
    pub fn show_toast(&self, toast: Toast) -> Vec<StateChange> {
        self.update(|state| state.visible_toasts.push(toast)).1
    }

    /// Remove a toast from the visible set
    ///
    /// Returns `true` if the toast was visible.
    pub fn close_toast(&self, id: &str) -> bool {
        self.update(|state| {
            let before = state.visible_toasts.len();
            state.visible_toasts.retain(|t| t.id != id);
            before != state.visible_toasts.len()
        })
        .0
    }
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new()
    }
}

// Make StateManager cloneable for sharing across tasks
impl Clone for StateManager {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            state_tx: self.state_tx.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NotificationKind;
    use std::time::{Duration, Instant};

    fn toast(id: &str) -> Toast {
        Toast {
            id: id.to_string(),
            kind: NotificationKind::Info,
            title: "Info".to_string(),
            message: "message".to_string(),
            duration: Duration::from_millis(3000),
            queued_at: Instant::now(),
        }
    }

    #[test]
    fn test_new_state_manager() {
        let manager = StateManager::new();
        let state = manager.snapshot();

        assert!(!state.is_loading());
        assert!(!state.config_loading);
        assert_eq!(state.config_revision, 0);
    }

    #[test]
    fn test_loading_change_detection() {
        let manager = StateManager::new();

        let changes = manager.push_loading(LoadingEntry {
            id: 1,
            message: Some("Saving".to_string()),
        });

        assert_eq!(
            changes,
            vec![StateChange::LoadingChanged {
                is_loading: true,
                message: Some("Saving".to_string()),
            }]
        );
    }

    #[test]
    fn test_removing_buried_entry_emits_nothing() {
        let manager = StateManager::new();
        manager.push_loading(LoadingEntry { id: 1, message: Some("a".to_string()) });
        manager.push_loading(LoadingEntry { id: 2, message: Some("b".to_string()) });

        let mut rx = manager.subscribe();
        assert!(manager.remove_loading(1));
        assert!(rx.try_recv().is_err());

        assert!(!manager.remove_loading(1));
        assert_eq!(manager.read(|s| s.loading_entries.len()), 1);
    }

    #[test]
    fn test_config_flags() {
        let manager = StateManager::new();

        let changes = manager.set_config_loading(true);
        assert_eq!(changes, vec![StateChange::ConfigLoadingChanged { loading: true }]);

        assert_eq!(manager.bump_config_revision(), 1);
        assert_eq!(manager.bump_config_revision(), 2);
    }

    #[test]
    fn test_toast_events() {
        let manager = StateManager::new();
        let mut rx = manager.subscribe();

        manager.show_toast(toast("t1"));
        assert_eq!(
            rx.try_recv().unwrap(),
            StateChange::ToastShown { id: "t1".to_string() }
        );

        assert!(manager.close_toast("t1"));
        assert_eq!(
            rx.try_recv().unwrap(),
            StateChange::ToastClosed { id: "t1".to_string() }
        );

        assert!(!manager.close_toast("t1"));
    }

    #[test]
    fn test_multiple_subscribers() {
        let manager = StateManager::new();
        let mut rx1 = manager.subscribe();
        let mut rx2 = manager.subscribe();

        manager.set_config_loading(true);

        assert!(rx1.try_recv().is_ok());
        assert!(rx2.try_recv().is_ok());
    }

    #[test]
    fn test_clone_state_manager() {
        let manager1 = StateManager::new();
        let manager2 = manager1.clone();

        manager1.set_config_loading(true);

        assert!(manager2.read(|s| s.config_loading));
    }
}
