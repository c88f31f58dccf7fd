//! Integration tests for SoundPreferenceEditor
//!
//! These tests verify that previews receive a normalized snapshot and that
//! file choices land in the right slot.

use mockall::mock;
use rgsm_frontend::backend::{BackendFuture, ready};
use rgsm_frontend::i18n::Translator;
use rgsm_frontend::models::{
    BackendEvent, Config, Device, QuickActionSoundEffect, QuickActionSoundPreferences,
    QuickActionSoundSlots, QuickActionSoundSource, Toast,
};
use rgsm_frontend::services::{NotificationSettings, SoundMode, SoundPreferenceEditor};
use rgsm_frontend::ui::ToastRenderer;
use rgsm_frontend::{AppContext, Backend, CommandResult, ConfigError, ConfigStore, Host};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use tokio::time::{Duration, sleep};

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

#[derive(Default)]
struct Recording {
    shown: Mutex<Vec<String>>,
}

impl ToastRenderer for Recording {
    fn render(&self, toast: &Toast) {
        self.shown.lock().unwrap().push(toast.message.clone());
    }

    fn dismiss(&self, _id: &str) {}
}

async fn create_editor(mut mock: MockBackend) -> (SoundPreferenceEditor, Arc<ConfigStore>, Arc<Recording>) {
    mock.expect_get_local_config()
        .returning(|| ready(Ok(CommandResult::ok(Config::default()))));

    let renderer = Arc::new(Recording::default());
    let ctx = AppContext::new(
        renderer.clone(),
        Translator::builtin(),
        NotificationSettings::default(),
    );
    let store = ConfigStore::new(Host::Desktop(Arc::new(mock)), ctx);
    store.refresh_config().await;

    (SoundPreferenceEditor::new(Arc::clone(&store)), store, renderer)
}

#[tokio::test]
async fn test_preview_receives_normalized_snapshot() {
    let mut mock = MockBackend::new();
    mock.expect_toggle_quick_action_sound_preview()
        .withf(|prefs, effect| {
            prefs.enable_sound
                && prefs.sounds == QuickActionSoundSlots::default()
                && *effect == QuickActionSoundEffect::Failure
        })
        .times(1)
        .returning(|_, _| ready(Ok(CommandResult::ok(true))));

    let (editor, store, _renderer) = create_editor(mock).await;

    assert!(editor.preview(QuickActionSoundEffect::Failure).await.unwrap());
    // Building the snapshot does not edit the document
    assert!(!store.has_unsaved_changes());
}

#[tokio::test]
async fn test_chosen_file_fills_slot() {
    let mut mock = MockBackend::new();
    mock.expect_choose_quick_action_sound_file()
        .times(1)
        .returning(|| ready(Ok(CommandResult::ok(Some("/sounds/chime.wav".to_string())))));

    let (editor, store, _renderer) = create_editor(mock).await;

    let chosen = editor.choose_file(QuickActionSoundEffect::Success).await.unwrap();
    assert_eq!(chosen.as_deref(), Some("/sounds/chime.wav"));
    assert_eq!(editor.mode(QuickActionSoundEffect::Success), Some(SoundMode::File));
    assert_eq!(editor.mode(QuickActionSoundEffect::Failure), Some(SoundMode::Default));

    let prefs = editor.preferences().unwrap();
    assert_eq!(
        prefs.sounds.success,
        QuickActionSoundSource::File {
            path: "/sounds/chime.wav".to_string()
        }
    );
    assert!(store.has_unsaved_changes());
}

#[tokio::test]
async fn test_dismissed_picker_leaves_slot() {
    let mut mock = MockBackend::new();
    mock.expect_choose_quick_action_sound_file()
        .returning(|| ready(Ok(CommandResult::ok(None))));

    let (editor, store, _renderer) = create_editor(mock).await;

    assert_eq!(editor.choose_file(QuickActionSoundEffect::Failure).await.unwrap(), None);
    assert_eq!(editor.mode(QuickActionSoundEffect::Failure), Some(SoundMode::Default));
    assert!(!store.has_unsaved_changes());
}

#[tokio::test]
async fn test_mode_round_trip_through_store() {
    let (editor, _store, _renderer) = create_editor(MockBackend::new()).await;

    assert!(editor.ensure_defaults().unwrap());
    assert!(!editor.ensure_defaults().unwrap());

    editor
        .set_mode(QuickActionSoundEffect::Success, SoundMode::File)
        .unwrap();
    assert_eq!(
        editor.preferences().unwrap().sounds.success,
        QuickActionSoundSource::File {
            path: String::new()
        }
    );

    editor
        .set_mode(QuickActionSoundEffect::Success, SoundMode::Default)
        .unwrap();
    assert_eq!(
        editor.preferences().unwrap().sounds.success,
        QuickActionSoundSource::Default
    );
}

#[tokio::test]
async fn test_preview_failure_notifies() {
    let mut mock = MockBackend::new();
    mock.expect_toggle_quick_action_sound_preview()
        .returning(|_, _| ready(Ok(CommandResult::error("no audio device"))));

    let (editor, _store, renderer) = create_editor(mock).await;

    let result = editor.preview(QuickActionSoundEffect::Success).await;
    assert!(matches!(result, Err(ConfigError::Backend(_))));

    sleep(Duration::from_millis(50)).await;
    let shown = renderer.shown.lock().unwrap();
    assert_eq!(shown.len(), 1);
    assert!(shown[0].contains("no audio device"));
}

#[tokio::test]
async fn test_preview_mode_skips_backend() {
    let ctx = AppContext::new(
        Arc::new(Recording::default()),
        Translator::builtin(),
        NotificationSettings::default(),
    );
    let store = ConfigStore::new(Host::BrowserPreview, ctx);
    let editor = SoundPreferenceEditor::new(store);

    assert!(!editor.preview(QuickActionSoundEffect::Success).await.unwrap());
    assert_eq!(editor.choose_file(QuickActionSoundEffect::Success).await.unwrap(), None);
}
