//! Process-wide cache of the backend's configuration document.
//!
//! See [`ConfigStore`] for the refresh/save rules.

mod store;

use crate::backend::TransportError;
use thiserror::Error;

pub use store::{ConfigStore, RefreshMode, RefreshOutcome};

/// Errors surfaced by configuration operations
///
/// UI-facing operations have already logged and notified by the time they
/// return one of these; callers only need it for control flow.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Backend reported an error: {0}")]
    Backend(String),

    #[error("Backend call failed: {0}")]
    Transport(#[from] TransportError),

    #[error("Configuration changed in the background since it was loaded")]
    StaleDocument,

    #[error("A game named {0} already exists")]
    DuplicateGame(String),

    #[error("Game {0} not found")]
    GameNotFound(String),

    #[error("Configuration has not been loaded")]
    NotLoaded,

    #[error("Operation canceled")]
    Canceled,
}
