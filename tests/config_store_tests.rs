//! Integration tests for ConfigStore
//!
//! These tests verify that the store:
//! - Falls back to the default document on every kind of load failure
//! - Always clears its loading flag
//! - Skips the backend entirely in preview mode
//! - Refreshes after a successful quick backup, without clobbering local edits

use mockall::mock;
use rgsm_frontend::backend::{BackendFuture, ready};
use rgsm_frontend::i18n::Translator;
use rgsm_frontend::models::{
    BackendEvent, Config, Device, Game, QuickActionCompleted, QuickActionOperation,
    QuickActionSoundEffect, QuickActionSoundPreferences, QuickActionStatus, QuickActionType,
    SaveUnit, SaveUnitType, Toast,
};
use rgsm_frontend::services::NotificationSettings;
use rgsm_frontend::ui::{PromptFuture, Prompter, ToastRenderer};
use rgsm_frontend::{
    AppContext, Backend, CommandResult, ConfigError, ConfigStore, Host, LocalBackend,
    RefreshOutcome, StateChange, TransportError,
};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio::sync::broadcast;
use tokio::time::{Duration, sleep, timeout};

mock! {
    pub Backend {}

    impl Backend for Backend {
        fn get_local_config(&self) -> BackendFuture<Config>;
        fn set_config(&self, config: Config) -> BackendFuture<()>;
        fn reset_settings(&self) -> BackendFuture<()>;
        fn get_current_device_info(&self) -> BackendFuture<Device>;
        fn toggle_quick_action_sound_preview(
            &self,
            preferences: QuickActionSoundPreferences,
            effect: QuickActionSoundEffect,
        ) -> BackendFuture<bool>;
        fn choose_quick_action_sound_file(&self) -> BackendFuture<Option<String>>;
        fn subscribe(&self) -> broadcast::Receiver<BackendEvent>;
    }
}

mock! {
    pub Prompter {}

    impl Prompter for Prompter {
        fn confirm(&self, title: &str, message: &str) -> PromptFuture<bool>;
        fn choose(&self, title: &str, options: &[String]) -> PromptFuture<Option<usize>>;
    }
}

#[derive(Default)]
struct Recording {
    shown: Mutex<Vec<Toast>>,
}

impl Recording {
    fn messages(&self) -> Vec<String> {
        self.shown
            .lock()
            .unwrap()
            .iter()
            .map(|t| t.message.clone())
            .collect()
    }
}

impl ToastRenderer for Recording {
    fn render(&self, toast: &Toast) {
        self.shown.lock().unwrap().push(toast.clone());
    }

    fn dismiss(&self, _id: &str) {}
}

fn create_context() -> (AppContext, Arc<Recording>) {
    let renderer = Arc::new(Recording::default());
    let ctx = AppContext::new(
        renderer.clone(),
        Translator::builtin(),
        NotificationSettings {
            gap: Duration::from_millis(1),
            default_duration: Duration::from_secs(60),
        },
    );
    (ctx, renderer)
}

fn create_local_backend() -> (LocalBackend, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let path = camino::Utf8PathBuf::try_from(temp_dir.path().join("config.json")).unwrap();
    let device = Device {
        id: "pc".to_string(),
        name: "Desk PC".to_string(),
    };
    (LocalBackend::new(path, device), temp_dir)
}

fn successful_backup() -> BackendEvent {
    BackendEvent::QuickActionCompleted(QuickActionCompleted {
        operation: QuickActionOperation::Backup,
        status: QuickActionStatus::Success,
        trigger: QuickActionType::Hotkey,
        game_name: Some("Celeste".to_string()),
    })
}

async fn wait_until(mut condition: impl FnMut() -> bool) {
    timeout(Duration::from_secs(5), async {
        while !condition() {
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("Timeout waiting for condition");
}

#[tokio::test]
async fn test_fallback_is_idempotent() {
    let mut mock = MockBackend::new();
    mock.expect_get_local_config()
        .times(2)
        .returning(|| ready(Ok(CommandResult::error("disk on fire"))));

    let (ctx, renderer) = create_context();
    let store = ConfigStore::new(Host::Desktop(Arc::new(mock)), ctx);

    assert_eq!(store.refresh_config().await, RefreshOutcome::FellBack);
    let first = store.config();
    assert_eq!(store.refresh_config().await, RefreshOutcome::FellBack);

    assert_eq!(first, Some(Config::default()));
    assert_eq!(store.config(), first);

    // One notification per failure
    wait_until(|| renderer.messages().len() == 2).await;
    assert!(renderer.messages()[0].contains("disk on fire"));
}

#[tokio::test]
async fn test_loading_flag_cleared_after_transport_failure() {
    let mut mock = MockBackend::new();
    mock.expect_get_local_config()
        .returning(|| ready(Err(TransportError::Disconnected("ipc closed".to_string()))));

    let (ctx, _renderer) = create_context();
    let mut rx = ctx.state.subscribe();
    let store = ConfigStore::new(Host::Desktop(Arc::new(mock)), ctx);

    store.refresh_config().await;
    assert!(!store.is_loading());

    let mut flags = Vec::new();
    while let Ok(change) = rx.try_recv() {
        if let StateChange::ConfigLoadingChanged { loading } = change {
            flags.push(loading);
        }
    }
    assert_eq!(flags, vec![true, false]);
}

#[tokio::test]
async fn test_preview_mode_never_touches_backend() {
    let (ctx, _renderer) = create_context();
    let store = ConfigStore::new(Host::BrowserPreview, ctx);

    assert_eq!(store.config(), Some(Config::default()));

    store.init().await;
    assert_eq!(store.register_current_device().await.unwrap(), None);
    assert!(store.save_config().await.is_ok());
    assert!(!store.is_loading());
}

#[tokio::test]
async fn test_save_clears_unsaved_flag() {
    let (backend, _temp_dir) = create_local_backend();
    let (ctx, _renderer) = create_context();
    let store = ConfigStore::new(Host::Desktop(Arc::new(backend.clone())), ctx);
    store.refresh_config().await;

    store
        .update(|config| config.add_game(Game::new("Celeste")))
        .unwrap()
        .unwrap();
    assert!(store.has_unsaved_changes());

    store.save_config().await.unwrap();
    assert!(!store.has_unsaved_changes());

    let persisted = backend.get_local_config().await.unwrap().into_result().unwrap();
    assert!(persisted.find_game("celeste").is_some());
}

#[tokio::test]
async fn test_backup_event_triggers_refresh() {
    let (backend, _temp_dir) = create_local_backend();
    let (ctx, _renderer) = create_context();
    let store = ConfigStore::new(Host::Desktop(Arc::new(backend.clone())), ctx);
    store.init().await;
    let revision = store.revision();

    // The backend writes a new document, then reports the backup
    let mut remote = Config::default();
    remote.backup_path = "/mnt/backups".to_string();
    backend.set_config(remote).await.unwrap();
    assert!(backend.emit(successful_backup()) > 0);

    wait_until(|| store.revision() > revision).await;
    assert_eq!(
        store.read(|c| c.backup_path.clone()).as_deref(),
        Some("/mnt/backups")
    );
    store.dispose();
}

#[tokio::test]
async fn test_failed_backup_does_not_refresh() {
    let (backend, _temp_dir) = create_local_backend();
    let (ctx, _renderer) = create_context();
    let store = ConfigStore::new(Host::Desktop(Arc::new(backend.clone())), ctx);
    store.init().await;
    let revision = store.revision();

    backend.emit(BackendEvent::QuickActionCompleted(QuickActionCompleted {
        operation: QuickActionOperation::Backup,
        status: QuickActionStatus::Failure,
        trigger: QuickActionType::Timer,
        game_name: None,
    }));
    sleep(Duration::from_millis(100)).await;

    assert_eq!(store.revision(), revision);
}

#[tokio::test]
async fn test_background_change_makes_local_edits_stale() {
    let (backend, _temp_dir) = create_local_backend();
    let (ctx, renderer) = create_context();
    let store = ConfigStore::new(Host::Desktop(Arc::new(backend.clone())), ctx);
    store.init().await;

    let mut game = Game::new("Celeste");
    game.save_paths
        .push(SaveUnit::new(SaveUnitType::Folder).with_path("pc", "/saves"));
    store
        .update(|config| config.add_game(game))
        .unwrap()
        .unwrap();

    backend.emit(successful_backup());
    wait_until(|| store.is_stale()).await;

    // Local edit survives the event-driven refresh
    assert!(store.read(|c| c.find_game("Celeste").is_some()).unwrap());

    let result = store.save_config().await;
    assert!(matches!(result, Err(ConfigError::StaleDocument)));
    wait_until(|| {
        renderer
            .messages()
            .iter()
            .any(|m| m.contains("Reload before saving"))
    })
    .await;

    // An explicit reload discards the edit and unblocks saving
    assert_eq!(store.refresh_config().await, RefreshOutcome::Loaded);
    assert!(!store.is_stale());
    assert!(store.read(|c| c.find_game("Celeste").is_none()).unwrap());
    assert!(store.save_config().await.is_ok());
}

#[tokio::test]
async fn test_reset_settings_confirmed() {
    let (backend, _temp_dir) = create_local_backend();
    let (ctx, renderer) = create_context();
    let store = ConfigStore::new(Host::Desktop(Arc::new(backend.clone())), ctx);
    store.refresh_config().await;

    store
        .update(|config| config.settings.exit_to_tray = !config.settings.exit_to_tray)
        .unwrap();
    store.save_config().await.unwrap();

    let mut prompter = MockPrompter::new();
    prompter
        .expect_confirm()
        .times(1)
        .returning(|_, _| Box::pin(async { true }));

    assert_eq!(
        store.reset_settings(&prompter).await.unwrap(),
        RefreshOutcome::Loaded
    );

    assert_eq!(
        store.read(|c| c.settings.clone()),
        Some(Config::default().settings)
    );
    wait_until(|| !renderer.messages().is_empty()).await;
}

#[tokio::test]
async fn test_reset_reports_failed_reload() {
    let loads = Arc::new(Mutex::new(0));
    let counter = Arc::clone(&loads);

    let mut mock = MockBackend::new();
    mock.expect_get_local_config().returning(move || {
        let mut n = counter.lock().unwrap();
        *n += 1;
        if *n == 1 {
            ready(Ok(CommandResult::ok(Config::default())))
        } else {
            ready(Ok(CommandResult::error("config file locked")))
        }
    });
    mock.expect_reset_settings()
        .times(1)
        .returning(|| ready(Ok(CommandResult::ok(()))));

    let (ctx, renderer) = create_context();
    let store = ConfigStore::new(Host::Desktop(Arc::new(mock)), ctx);
    store.refresh_config().await;

    let mut prompter = MockPrompter::new();
    prompter
        .expect_confirm()
        .returning(|_, _| Box::pin(async { true }));

    assert_eq!(
        store.reset_settings(&prompter).await.unwrap(),
        RefreshOutcome::FellBack
    );
    assert_eq!(*loads.lock().unwrap(), 2);

    // Only the load failure is shown, no success toast
    wait_until(|| !renderer.messages().is_empty()).await;
    sleep(Duration::from_millis(50)).await;
    let messages = renderer.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("config file locked"));
}

#[tokio::test]
async fn test_register_current_device_saves_once() {
    let (backend, _temp_dir) = create_local_backend();
    let (ctx, _renderer) = create_context();
    let store = ConfigStore::new(Host::Desktop(Arc::new(backend.clone())), ctx);
    store.refresh_config().await;

    let device = store.register_current_device().await.unwrap().unwrap();
    assert_eq!(device.label(), "Desk PC (pc)");
    assert!(!store.has_unsaved_changes());

    // Second call finds the device already registered
    store.register_current_device().await.unwrap();
    assert!(!store.has_unsaved_changes());

    let persisted = backend.get_local_config().await.unwrap().into_result().unwrap();
    assert_eq!(persisted.devices.len(), 1);
}

#[tokio::test]
async fn test_save_failure_keeps_document() {
    let mut mock = MockBackend::new();
    mock.expect_get_local_config()
        .returning(|| ready(Ok(CommandResult::ok(Config::default()))));
    mock.expect_set_config()
        .times(1)
        .returning(|_| ready(Ok(CommandResult::error("read-only file system"))));

    let (ctx, renderer) = create_context();
    let store = ConfigStore::new(Host::Desktop(Arc::new(mock)), ctx);
    store.refresh_config().await;

    store.update(|config| config.backup_path = "/new".to_string()).unwrap();
    let result = store.save_config().await;

    assert!(matches!(result, Err(ConfigError::Backend(_))));
    assert!(store.has_unsaved_changes());
    assert_eq!(store.read(|c| c.backup_path.clone()).as_deref(), Some("/new"));
    wait_until(|| renderer.messages().iter().any(|m| m.contains("read-only"))).await;
}
