use super::ConfigError;
use crate::backend::{CommandResult, Host, TransportError};
use crate::context::AppContext;
use crate::models::{BackendEvent, Config, Device};
use crate::state::StateManager;
use crate::ui::Prompter;
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// How a refresh treats unsaved local edits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshMode {
    /// Replace the document unconditionally
    Replace,
    /// Keep a document with unsaved edits and flag it stale instead
    PreserveLocalEdits,
}

/// What a refresh did to the in-memory document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The backend's document replaced the cached one
    Loaded,
    /// The backend failed and the default document is now cached
    FellBack,
    /// Unsaved local edits were kept; the document is marked stale
    Deferred,
}

#[derive(Debug, Default)]
struct Document {
    config: Option<Config>,
    /// Local edits not yet saved
    dirty: bool,
    /// Bumped on every local edit
    edit_seq: u64,
    /// The backend changed the document while local edits were pending
    remote_changed: bool,
}

/// Clears the config loading flag however a refresh ends
struct LoadingFlag<'a>(&'a StateManager);

impl<'a> LoadingFlag<'a> {
    fn raise(state: &'a StateManager) -> Self {
        state.set_config_loading(true);
        Self(state)
    }
}

impl Drop for LoadingFlag<'_> {
    fn drop(&mut self) {
        self.0.set_config_loading(false);
    }
}

/// Cache of the configuration document shared by every UI surface
///
/// Construct one per process with [`ConfigStore::new`], call
/// [`init`](Self::init) once, share the `Arc`, and [`dispose`](Self::dispose)
/// on shutdown.
///
/// # Refresh and save
///
/// - [`refresh_config`](Self::refresh_config) replaces the document with the
///   backend's. On any failure it logs, shows one error notification and falls
///   back to [`Config::default`], so the store never ends up empty.
/// - [`save_config`](Self::save_config) submits the current document. Failures
///   are logged and notified; the local document is kept as is.
/// - A successful `Backup` quick action reported by the backend triggers a
///   refresh in [`RefreshMode::PreserveLocalEdits`]: when the user has unsaved
///   edits the remote copy is not applied, and the next save is rejected with
///   [`ConfigError::StaleDocument`] until the user reloads.
///
/// # Preview mode
///
/// Under [`Host::BrowserPreview`] no backend call or subscription is made and
/// the default document is available immediately.
pub struct ConfigStore {
    host: Host,
    ctx: AppContext,
    doc: RwLock<Document>,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl ConfigStore {
    pub fn new(host: Host, ctx: AppContext) -> Arc<Self> {
        let doc = Document {
            config: (!host.is_desktop()).then(Config::default),
            ..Document::default()
        };

        Arc::new(Self {
            host,
            ctx,
            doc: RwLock::new(doc),
            listener: Mutex::new(None),
        })
    }

    fn read_doc(&self) -> RwLockReadGuard<'_, Document> {
        self.doc.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_doc(&self) -> RwLockWriteGuard<'_, Document> {
        self.doc.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Load the document and start listening for backend events
    pub async fn init(self: &Arc<Self>) {
        self.refresh_config().await;

        let Some(backend) = self.host.backend() else {
            return;
        };

        let rx = backend.subscribe();
        let handle = tokio::spawn(Self::listen(Arc::downgrade(self), rx));
        let previous = self
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(handle);
        if let Some(previous) = previous {
            previous.abort();
        }

        tracing::info!("Config store initialized");
    }

    /// Stop listening for backend events
    pub fn dispose(&self) {
        if let Some(handle) = self
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.abort();
            tracing::debug!("Config store disposed");
        }
    }

    async fn listen(store: Weak<Self>, mut rx: broadcast::Receiver<BackendEvent>) {
        loop {
            match rx.recv().await {
                Ok(BackendEvent::QuickActionCompleted(event)) => {
                    if !event.is_successful_backup() {
                        continue;
                    }
                    let Some(store) = store.upgrade() else {
                        break;
                    };
                    tracing::info!(
                        "Quick backup of {:?} completed, refreshing config",
                        event.game_name
                    );
                    store.refresh(RefreshMode::PreserveLocalEdits).await;
                }
                Ok(BackendEvent::Notification(_)) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("Missed {} backend events", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }

    /// Copy of the cached document, `None` before the first load
    pub fn config(&self) -> Option<Config> {
        self.read_doc().config.clone()
    }

    /// Run `f` against the cached document without cloning it
    pub fn read<F, R>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&Config) -> R,
    {
        self.read_doc().config.as_ref().map(f)
    }

    /// Edit the cached document in place.
    ///
    /// Nothing is persisted until [`save_config`](Self::save_config).
    pub fn update<F, R>(&self, f: F) -> Result<R, ConfigError>
    where
        F: FnOnce(&mut Config) -> R,
    {
        let mut doc = self.write_doc();
        let config = doc.config.as_mut().ok_or(ConfigError::NotLoaded)?;
        let result = f(config);
        doc.dirty = true;
        doc.edit_seq += 1;
        Ok(result)
    }

    /// Whether a refresh is in flight
    pub fn is_loading(&self) -> bool {
        self.ctx.state.read(|s| s.config_loading)
    }

    /// Number of times the document has been replaced
    pub fn revision(&self) -> u64 {
        self.ctx.state.read(|s| s.config_revision)
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.read_doc().dirty
    }

    /// The backend changed the document while local edits were pending
    pub fn is_stale(&self) -> bool {
        self.read_doc().remote_changed
    }

    /// Replace the cached document with the backend's, discarding local edits
    pub async fn refresh_config(&self) -> RefreshOutcome {
        self.refresh(RefreshMode::Replace).await
    }

    pub async fn refresh(&self, mode: RefreshMode) -> RefreshOutcome {
        let Some(backend) = self.host.backend() else {
            let mut doc = self.write_doc();
            if doc.config.is_none() {
                doc.config = Some(Config::default());
            }
            return RefreshOutcome::Loaded;
        };

        let _flag = LoadingFlag::raise(&self.ctx.state);
        let seq_before = self.read_doc().edit_seq;

        match backend.get_local_config().await {
            Ok(CommandResult::Ok { data }) => self.apply_remote(data, mode, seq_before),
            Ok(CommandResult::Error { error }) => {
                tracing::error!("Backend failed to load config: {}", error);
                self.fall_back(mode, &error)
            }
            Err(e) => {
                tracing::error!("Config request did not reach the backend");
                tracing::debug!("Raw transport error: {:?}", e);
                self.fall_back(mode, &e.to_string())
            }
        }
    }

    fn apply_remote(&self, remote: Config, mode: RefreshMode, seq_before: u64) -> RefreshOutcome {
        let mut doc = self.write_doc();

        let has_local_edits = doc.dirty || doc.edit_seq != seq_before;
        if mode == RefreshMode::PreserveLocalEdits && has_local_edits {
            doc.remote_changed = true;
            drop(doc);

            tracing::warn!(
                "Config changed in the background while local edits are unsaved; keeping local copy"
            );
            self.ctx.metrics.record_refresh_deferred();
            self.ctx.notifications.warning(self.ctx.t("config.changed_externally"));
            return RefreshOutcome::Deferred;
        }

        let cloud = remote.settings.cloud_settings.backend.describe();
        doc.config = Some(remote);
        doc.dirty = false;
        doc.remote_changed = false;
        drop(doc);

        let revision = self.ctx.state.bump_config_revision();
        self.ctx.metrics.record_refresh(true);
        tracing::info!("Config loaded (revision {}, cloud {})", revision, cloud);
        RefreshOutcome::Loaded
    }

    fn fall_back(&self, mode: RefreshMode, error: &str) -> RefreshOutcome {
        self.ctx.metrics.record_refresh(false);
        self.ctx
            .notifications
            .error(self.ctx.t_with("config.refresh_failed", &[("error", error)]));

        let mut doc = self.write_doc();
        if mode == RefreshMode::PreserveLocalEdits && doc.dirty {
            tracing::warn!("Keeping unsaved local config after failed refresh");
            return RefreshOutcome::Deferred;
        }

        doc.config = Some(Config::default());
        doc.dirty = false;
        doc.remote_changed = false;
        drop(doc);

        self.ctx.state.bump_config_revision();
        tracing::warn!("Using default config");
        RefreshOutcome::FellBack
    }

    /// Persist the cached document.
    ///
    /// Errors have already been logged and shown to the user.
    pub async fn save_config(&self) -> Result<(), ConfigError> {
        let Some(backend) = self.host.backend() else {
            tracing::debug!("Preview mode, config not persisted");
            self.write_doc().dirty = false;
            return Ok(());
        };

        let (snapshot, seq) = {
            let doc = self.read_doc();
            if doc.remote_changed {
                drop(doc);
                return Err(self.report_save_failure(ConfigError::StaleDocument));
            }
            match doc.config.clone() {
                Some(config) => (config, doc.edit_seq),
                None => {
                    drop(doc);
                    return Err(self.report_save_failure(ConfigError::NotLoaded));
                }
            }
        };

        match backend.set_config(snapshot).await {
            Ok(CommandResult::Ok { .. }) => {
                let mut doc = self.write_doc();
                if doc.edit_seq == seq {
                    doc.dirty = false;
                }
                drop(doc);
                self.ctx.metrics.record_save(true);
                tracing::info!("Config saved");
                Ok(())
            }
            Ok(CommandResult::Error { error }) => {
                Err(self.report_save_failure(ConfigError::Backend(error)))
            }
            Err(e) => Err(self.report_transport_failure(e)),
        }
    }

    fn report_transport_failure(&self, e: TransportError) -> ConfigError {
        tracing::debug!("Raw transport error: {:?}", e);
        self.report_save_failure(ConfigError::Transport(e))
    }

    fn report_save_failure(&self, err: ConfigError) -> ConfigError {
        self.ctx.metrics.record_save(false);
        match &err {
            ConfigError::StaleDocument => {
                tracing::warn!("Rejected save of a stale config");
                self.ctx.notifications.warning(self.ctx.t("config.stale"));
            }
            other => {
                tracing::error!("Failed to save config: {}", other);
                self.ctx.notifications.error(
                    self.ctx
                        .t_with("config.save_failed", &[("error", &other.to_string())]),
                );
            }
        }
        err
    }

    /// Ask for confirmation, then restore default settings through the backend.
    ///
    /// On success returns how the forced reload went: anything other than
    /// [`RefreshOutcome::Loaded`] means the backend reset its settings but the
    /// store now holds the default document instead of the backend's.
    pub async fn reset_settings(&self, prompter: &dyn Prompter) -> Result<RefreshOutcome, ConfigError> {
        let confirmed = prompter
            .confirm(
                &self.ctx.t("config.reset_confirm_title"),
                &self.ctx.t("config.reset_confirm_message"),
            )
            .await;
        if !confirmed {
            tracing::info!("Settings reset canceled by user");
            self.ctx.notifications.info(self.ctx.t("common.operation_canceled"));
            return Err(ConfigError::Canceled);
        }

        let Some(backend) = self.host.backend() else {
            self.update(|config| config.settings = Config::default().settings)?;
            self.ctx.notifications.success(self.ctx.t("config.reset_succeeded"));
            return Ok(RefreshOutcome::Loaded);
        };

        let failure = match backend.reset_settings().await {
            Ok(CommandResult::Ok { .. }) => None,
            Ok(CommandResult::Error { error }) => Some(ConfigError::Backend(error)),
            Err(e) => {
                tracing::debug!("Raw transport error: {:?}", e);
                Some(ConfigError::Transport(e))
            }
        };

        if let Some(err) = failure {
            tracing::error!("Failed to reset settings: {}", err);
            self.ctx
                .notifications
                .error(self.ctx.t_with("config.reset_failed", &[("error", &err.to_string())]));
            return Err(err);
        }

        let outcome = self.refresh_config().await;
        if outcome == RefreshOutcome::Loaded {
            self.ctx.notifications.success(self.ctx.t("config.reset_succeeded"));
        } else {
            tracing::warn!("Settings were reset but the reload {:?}", outcome);
        }
        Ok(outcome)
    }

    /// Make sure the machine we run on is listed under `devices`.
    ///
    /// Returns the current device, or `None` in preview mode.
    pub async fn register_current_device(&self) -> Result<Option<Device>, ConfigError> {
        let Some(backend) = self.host.backend() else {
            return Ok(None);
        };

        let device = match backend.get_current_device_info().await {
            Ok(CommandResult::Ok { data }) => data,
            Ok(CommandResult::Error { error }) => {
                return Err(self.report_device_failure(ConfigError::Backend(error)));
            }
            Err(e) => {
                tracing::debug!("Raw transport error: {:?}", e);
                return Err(self.report_device_failure(ConfigError::Transport(e)));
            }
        };

        let changed = self.update(|config| {
            if config.devices.get(&device.id) == Some(&device) {
                return false;
            }
            config.devices.insert(device.id.clone(), device.clone());
            true
        })?;

        if changed {
            tracing::info!("Registered device {}", device.label());
            self.save_config().await?;
        }
        Ok(Some(device))
    }

    fn report_device_failure(&self, err: ConfigError) -> ConfigError {
        tracing::error!("Failed to read current device: {}", err);
        self.ctx
            .notifications
            .error(self.ctx.t_with("device.register_failed", &[("error", &err.to_string())]));
        err
    }

    pub fn context(&self) -> &AppContext {
        &self.ctx
    }

    pub fn host(&self) -> &Host {
        &self.host
    }
}

impl Drop for ConfigStore {
    fn drop(&mut self) {
        self.dispose();
    }
}
