//! Command/event contract with the save manager backend.
//!
//! Every command resolves to a [`CommandResult`]: either `{status: "ok", data}` or
//! `{status: "error", error}`. A command that never reaches the backend fails with
//! a [`TransportError`] instead. Events pushed by the backend arrive on a
//! broadcast channel obtained from [`Backend::subscribe`].
//!
//! The UI layer only talks to `dyn Backend`; [`LocalBackend`] is the file-backed
//! implementation used by the headless shell.

pub mod local;

use crate::models::{BackendEvent, Config, Device, QuickActionSoundEffect, QuickActionSoundPreferences};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast;

pub use local::LocalBackend;

/// Environment variable whose presence marks a running desktop host shell
pub const HOST_IPC_ENV: &str = "RGSM_HOST_IPC";

/// Result envelope returned by every backend command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CommandResult<T> {
    Ok { data: T },
    Error { error: String },
}

impl<T> CommandResult<T> {
    pub fn ok(data: T) -> Self {
        CommandResult::Ok { data }
    }

    pub fn error(error: impl Into<String>) -> Self {
        CommandResult::Error {
            error: error.into(),
        }
    }

    pub fn into_result(self) -> Result<T, String> {
        match self {
            CommandResult::Ok { data } => Ok(data),
            CommandResult::Error { error } => Err(error),
        }
    }
}

/// The command never produced a result
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Backend is not reachable: {0}")]
    Disconnected(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Future returned by every backend command
pub type BackendFuture<T> =
    Pin<Box<dyn Future<Output = Result<CommandResult<T>, TransportError>> + Send>>;

/// Wrap an already-known outcome as a [`BackendFuture`].
pub fn ready<T: Send + 'static>(
    outcome: Result<CommandResult<T>, TransportError>,
) -> BackendFuture<T> {
    Box::pin(std::future::ready(outcome))
}

/// Commands and events consumed by the UI state layer
#[cfg_attr(test, mockall::automock)]
pub trait Backend: Send + Sync {
    /// `getLocalConfig`
    fn get_local_config(&self) -> BackendFuture<Config>;

    /// `setConfig`
    fn set_config(&self, config: Config) -> BackendFuture<()>;

    /// `resetSettings`: overwrite the settings section with defaults
    fn reset_settings(&self) -> BackendFuture<()>;

    /// `getCurrentDeviceInfo`
    fn get_current_device_info(&self) -> BackendFuture<Device>;

    /// `toggleQuickActionSoundPreview`; resolves to whether a preview is now playing
    fn toggle_quick_action_sound_preview(
        &self,
        preferences: QuickActionSoundPreferences,
        effect: QuickActionSoundEffect,
    ) -> BackendFuture<bool>;

    /// `chooseQuickActionSoundFile`; `None` when the user dismissed the picker
    fn choose_quick_action_sound_file(&self) -> BackendFuture<Option<String>>;

    /// Receiver for `quickActionCompleted` and `Notification` events
    fn subscribe(&self) -> broadcast::Receiver<BackendEvent>;
}

/// Where the UI is running.
///
/// Outside the desktop host there is no backend: no command is sent, no
/// event is subscribed, and the default document is used.
#[derive(Clone)]
pub enum Host {
    Desktop(Arc<dyn Backend>),
    BrowserPreview,
}

impl Host {
    /// Probe for the host invocation hook and connect when it is present.
    pub fn probe<F>(connect: F) -> Self
    where
        F: FnOnce() -> Arc<dyn Backend>,
    {
        if std::env::var_os(HOST_IPC_ENV).is_some() {
            tracing::info!("Desktop host detected, connecting to backend");
            Host::Desktop(connect())
        } else {
            tracing::info!("No desktop host detected, running in preview mode");
            Host::BrowserPreview
        }
    }

    pub fn backend(&self) -> Option<&Arc<dyn Backend>> {
        match self {
            Host::Desktop(backend) => Some(backend),
            Host::BrowserPreview => None,
        }
    }

    pub fn is_desktop(&self) -> bool {
        matches!(self, Host::Desktop(_))
    }
}

impl fmt::Debug for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Host::Desktop(_) => f.write_str("Host::Desktop"),
            Host::BrowserPreview => f.write_str("Host::BrowserPreview"),
        }
    }
}
