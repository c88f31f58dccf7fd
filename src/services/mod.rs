//! Services module - UI-side helpers shared by every screen.
//!
//! # Components
//!
//! - [`NotificationQueue`]: paced FIFO of toasts
//! - [`LoadingStack`]: nested busy scopes behind the global spinner
//! - [`device_paths`]: copying a game's paths from another device to this one
//! - [`sound_prefs`]: normalizing quick-action sound settings
//!
//! Side effects reach the screen only through the [`ToastRenderer`](crate::ui::ToastRenderer)
//! and [`Prompter`](crate::ui::Prompter) seams.

pub mod device_paths;
pub mod loading;
pub mod notification;
pub mod sound_prefs;

pub use device_paths::{
    Reconciliation, check_current_device_save_paths, copy_missing_paths, needs_reconciliation,
    source_candidates,
};
pub use loading::{LoadingGuard, LoadingStack};
pub use notification::{NotificationOptions, NotificationQueue, NotificationSettings};
pub use sound_prefs::{
    SoundMode, SoundPreferenceEditor, build_sound_preferences, ensure_quick_action_defaults,
    set_sound_file, set_sound_mode, sound_mode,
};
