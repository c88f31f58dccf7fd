use super::{Backend, BackendFuture, CommandResult, TransportError};
use crate::models::{
    BackendEvent, Config, Device, QuickActionSoundEffect, QuickActionSoundPreferences,
    QuickActionSoundSource,
};
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::broadcast;

/// Backend that keeps the configuration document in a JSON file.
///
/// Used by the headless shell and by integration tests. Commands that touch
/// the file are serialized through an async mutex; failures are reported as
/// `{status: "error"}` results the same way the desktop backend reports them.
#[derive(Clone)]
pub struct LocalBackend {
    inner: Arc<LocalInner>,
}

struct LocalInner {
    config_path: Utf8PathBuf,
    device: Device,
    events: broadcast::Sender<BackendEvent>,
    file_lock: tokio::sync::Mutex<()>,
    previewing: Mutex<Option<QuickActionSoundEffect>>,
}

impl LocalBackend {
    pub fn new(config_path: impl AsRef<Utf8Path>, device: Device) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            inner: Arc::new(LocalInner {
                config_path: config_path.as_ref().to_path_buf(),
                device,
                events,
                file_lock: tokio::sync::Mutex::new(()),
                previewing: Mutex::new(None),
            }),
        }
    }

    pub fn config_path(&self) -> &Utf8Path {
        &self.inner.config_path
    }

    /// Push an event to every subscriber, as the host does after a quick action.
    ///
    /// Returns the number of subscribers that received it.
    pub fn emit(&self, event: BackendEvent) -> usize {
        self.inner.events.send(event).unwrap_or(0)
    }

    fn run<T, F, Fut>(&self, op: F) -> BackendFuture<T>
    where
        T: Send + 'static,
        F: FnOnce(Arc<LocalInner>) -> Fut + Send + 'static,
        Fut: std::future::Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        Box::pin(async move {
            Ok::<_, TransportError>(match op(inner).await {
                Ok(data) => CommandResult::ok(data),
                Err(e) => {
                    tracing::error!("Local backend command failed: {:#}", e);
                    CommandResult::error(format!("{:#}", e))
                }
            })
        })
    }
}

impl LocalInner {
    /// Read the document, creating it with defaults when missing
    async fn load(&self) -> anyhow::Result<Config> {
        if !tokio::fs::try_exists(&self.config_path).await.unwrap_or(false) {
            tracing::info!("Config file not found at {}, creating defaults", self.config_path);
            let config = Config::default();
            self.store(&config).await?;
            return Ok(config);
        }

        let contents = tokio::fs::read_to_string(&self.config_path)
            .await
            .with_context(|| format!("Failed to read config: {}", self.config_path))?;

        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config: {}", self.config_path))
    }

    async fn store(&self, config: &Config) -> anyhow::Result<()> {
        if let Some(parent) = self.config_path.parent() {
            if !parent.as_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("Failed to create config directory: {}", parent))?;
            }
        }

        let json = serde_json::to_string_pretty(config).context("Failed to serialize config")?;
        tokio::fs::write(&self.config_path, json)
            .await
            .with_context(|| format!("Failed to write config: {}", self.config_path))?;

        tracing::info!("Saved config to {}", self.config_path);
        Ok(())
    }
}

impl Backend for LocalBackend {
    fn get_local_config(&self) -> BackendFuture<Config> {
        self.run(|inner| async move {
            let _guard = inner.file_lock.lock().await;
            inner.load().await
        })
    }

    fn set_config(&self, config: Config) -> BackendFuture<()> {
        self.run(|inner| async move {
            let _guard = inner.file_lock.lock().await;
            inner.store(&config).await
        })
    }

    fn reset_settings(&self) -> BackendFuture<()> {
        self.run(|inner| async move {
            let _guard = inner.file_lock.lock().await;
            let mut config = inner.load().await?;
            config.settings = Config::default().settings;
            inner.store(&config).await
        })
    }

    fn get_current_device_info(&self) -> BackendFuture<Device> {
        self.run(|inner| async move { Ok(inner.device.clone()) })
    }

    fn toggle_quick_action_sound_preview(
        &self,
        preferences: QuickActionSoundPreferences,
        effect: QuickActionSoundEffect,
    ) -> BackendFuture<bool> {
        self.run(move |inner| async move {
            let mut previewing = inner
                .previewing
                .lock()
                .unwrap_or_else(PoisonError::into_inner);

            if *previewing == Some(effect) {
                *previewing = None;
                tracing::debug!("Stopped {:?} preview", effect);
                return Ok(false);
            }

            let source = match preferences.sounds.slot(effect) {
                QuickActionSoundSource::Default => "built-in".to_string(),
                QuickActionSoundSource::File { path } => path.clone(),
            };
            tracing::debug!(
                "Previewing {:?} sound from {} (enabled: {})",
                effect,
                source,
                preferences.enable_sound
            );
            *previewing = Some(effect);
            Ok(true)
        })
    }

    fn choose_quick_action_sound_file(&self) -> BackendFuture<Option<String>> {
        self.run(|_| async {
            tracing::debug!("No file picker available in the local backend");
            Ok(None)
        })
    }

    fn subscribe(&self) -> broadcast::Receiver<BackendEvent> {
        self.inner.events.subscribe()
    }
}
