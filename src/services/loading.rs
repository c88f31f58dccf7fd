use crate::i18n::Translator;
use crate::models::LoadingEntry;
use crate::state::StateManager;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Stack of pending busy scopes behind the global spinner
///
/// `is_loading` is true while any scope is pending. The displayed message
/// belongs to the most recently started pending scope; when that one ends the
/// display falls back to the next most recent. Scopes without a message show
/// the translated default.
#[derive(Clone)]
pub struct LoadingStack {
    state: StateManager,
    translator: Arc<Translator>,
    next_id: Arc<AtomicU64>,
}

/// Releases its scope when dropped
#[must_use = "the loading scope ends as soon as the guard is dropped"]
pub struct LoadingGuard {
    state: StateManager,
    id: u64,
}

impl LoadingGuard {
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.state.remove_loading(self.id);
    }
}

impl LoadingStack {
    pub fn new(state: StateManager, translator: Arc<Translator>) -> Self {
        Self {
            state,
            translator,
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    fn push(&self, message: Option<&str>) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.state.push_loading(LoadingEntry {
            id,
            message: message.map(str::to_string),
        });
        id
    }

    /// Push a scope that stays until [`stop_loading`](Self::stop_loading)
    pub fn start_loading(&self, message: Option<&str>) {
        let id = self.push(message);
        tracing::debug!("Loading scope {} started", id);
    }

    /// Pop the most recently started scope
    pub fn stop_loading(&self) {
        match self.state.pop_loading() {
            Some(entry) => tracing::debug!("Loading scope {} stopped", entry.id),
            None => tracing::debug!("stop_loading called with an empty stack"),
        }
    }

    /// Push a scope owned by the returned guard
    pub fn scope(&self, message: Option<&str>) -> LoadingGuard {
        LoadingGuard {
            state: self.state.clone(),
            id: self.push(message),
        }
    }

    /// Run `operation` inside a loading scope.
    ///
    /// The scope is released however the operation ends: with a value, with
    /// an error value, by panicking, or by the future being dropped.
    pub async fn with_loading<F, T>(&self, message: Option<&str>, operation: F) -> T
    where
        F: Future<Output = T>,
    {
        let _guard = self.scope(message);
        operation.await
    }

    pub fn is_loading(&self) -> bool {
        self.state.read(|s| s.is_loading())
    }

    /// Text to display, `None` when nothing is loading
    pub fn message(&self) -> Option<String> {
        self.state.read(|s| {
            s.top_loading_message().map(|top| match top {
                Some(message) => message.to_string(),
                None => self.translator.t("loading.default"),
            })
        })
    }
}
