// RGSM frontend - application state layer for the game save manager
//
// This is the library crate holding the configuration cache, notification
// queue, loading stack and the per-device path helpers. The binary crate
// (main.rs) wires them to a console shell.

pub mod backend;
pub mod config;
pub mod context;
pub mod i18n;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod settings;
pub mod state;
pub mod ui;

// Re-export commonly used types for convenience
pub use backend::{Backend, CommandResult, Host, LocalBackend, TransportError};
pub use config::{ConfigError, ConfigStore, RefreshMode, RefreshOutcome};
pub use context::AppContext;
pub use i18n::Translator;
pub use models::{Config, Device, Game, SaveUnit, UiState};
pub use services::{LoadingStack, NotificationQueue, SoundPreferenceEditor};
pub use settings::AppSettings;
pub use state::{StateChange, StateManager};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
