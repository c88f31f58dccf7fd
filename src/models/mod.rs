//! Data models for the save manager's UI state layer.
//!
//! - [`Config`]: the configuration document owned by the backend and cached by
//!   [`ConfigStore`](crate::config::ConfigStore)
//! - [`Game`], [`SaveUnit`], [`Device`]: games and their per-device paths
//! - [`BackendEvent`]: payloads pushed by the backend
//! - [`UiState`]: loading stack, visible toasts and store flags, wrapped by
//!   [`StateManager`](crate::state::StateManager)
//!
//! Tagged unions in the backend contract (`kind: "default" | "file"`, cloud
//! backend variants, event names) are plain Rust enums so every consumer
//! matches them exhaustively.

pub mod config;
pub mod events;
pub mod game;
pub mod ui_state;

pub use config::{
    CloudBackend, CloudSettings, Config, FavoriteTreeNode, QuickActionHotkeys,
    QuickActionSoundEffect, QuickActionSoundPreferences, QuickActionSoundSlots, QuickActionSoundSource,
    QuickActionsSettings, SaveListExpandBehavior, Settings,
};
pub use events::{
    BackendEvent, IpcNotification, NotificationLevel, QuickActionCompleted, QuickActionOperation,
    QuickActionStatus, QuickActionType,
};
pub use game::{Device, DeviceId, Game, SaveUnit, SaveUnitType};
pub use ui_state::{LoadingEntry, NotificationId, NotificationKind, Toast, UiState};
