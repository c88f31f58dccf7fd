use crate::backend::CommandResult;
use crate::config::{ConfigError, ConfigStore};
use crate::models::{
    Config, QuickActionSoundEffect, QuickActionSoundPreferences, QuickActionSoundSlots,
    QuickActionSoundSource, QuickActionsSettings,
};
use std::sync::Arc;

/// Two-way view over a sound slot's variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundMode {
    Default,
    File,
}

/// Fill in the quick-action fields older documents may lack.
///
/// Missing flags become `true`, missing sounds become the built-in ones.
/// Returns whether anything was filled.
pub fn ensure_quick_action_defaults(settings: &mut QuickActionsSettings) -> bool {
    let mut changed = false;

    if settings.enable_sound.is_none() {
        settings.enable_sound = Some(true);
        changed = true;
    }
    if settings.enable_notification.is_none() {
        settings.enable_notification = Some(true);
        changed = true;
    }
    if settings.sounds.is_none() {
        settings.sounds = Some(QuickActionSoundSlots::default());
        changed = true;
    }

    changed
}

pub fn sound_mode(settings: &QuickActionsSettings, effect: QuickActionSoundEffect) -> SoundMode {
    match settings.sounds.as_ref().map(|sounds| sounds.slot(effect)) {
        Some(QuickActionSoundSource::File { .. }) => SoundMode::File,
        Some(QuickActionSoundSource::Default) | None => SoundMode::Default,
    }
}

/// Switch a slot between the built-in sound and a file.
///
/// Switching to `File` keeps a path already entered; switching to `Default`
/// drops it.
pub fn set_sound_mode(
    settings: &mut QuickActionsSettings,
    effect: QuickActionSoundEffect,
    mode: SoundMode,
) {
    let slot = settings.sounds.get_or_insert_with(Default::default).slot_mut(effect);

    match mode {
        SoundMode::Default => *slot = QuickActionSoundSource::Default,
        SoundMode::File => {
            if !matches!(slot, QuickActionSoundSource::File { .. }) {
                *slot = QuickActionSoundSource::File {
                    path: String::new(),
                };
            }
        }
    }
}

pub fn set_sound_file(
    settings: &mut QuickActionsSettings,
    effect: QuickActionSoundEffect,
    path: impl Into<String>,
) {
    *settings.sounds.get_or_insert_with(Default::default).slot_mut(effect) =
        QuickActionSoundSource::File { path: path.into() };
}

/// Owned, normalized preferences ready to hand to the backend.
///
/// `None` when no document is loaded. Later edits to the document do not
/// affect the returned value.
pub fn build_sound_preferences(config: Option<&Config>) -> Option<QuickActionSoundPreferences> {
    let mut quick_action = config?.quick_action.clone();
    ensure_quick_action_defaults(&mut quick_action);

    Some(QuickActionSoundPreferences {
        enable_sound: quick_action.enable_sound.unwrap_or(true),
        sounds: quick_action.sounds.unwrap_or_default(),
    })
}

/// Sound settings editor backed by the shared [`ConfigStore`]
///
/// Edits go to the cached document; saving is left to the caller.
#[derive(Clone)]
pub struct SoundPreferenceEditor {
    store: Arc<ConfigStore>,
}

impl SoundPreferenceEditor {
    pub fn new(store: Arc<ConfigStore>) -> Self {
        Self { store }
    }

    /// Normalize the cached document; only marks it edited when something was missing
    pub fn ensure_defaults(&self) -> Result<bool, ConfigError> {
        let incomplete = self
            .store
            .read(|config| {
                let quick_action = &config.quick_action;
                quick_action.enable_sound.is_none()
                    || quick_action.enable_notification.is_none()
                    || quick_action.sounds.is_none()
            })
            .ok_or(ConfigError::NotLoaded)?;

        if !incomplete {
            return Ok(false);
        }
        self.store
            .update(|config| ensure_quick_action_defaults(&mut config.quick_action))
    }

    pub fn mode(&self, effect: QuickActionSoundEffect) -> Option<SoundMode> {
        self.store
            .read(|config| sound_mode(&config.quick_action, effect))
    }

    pub fn set_mode(&self, effect: QuickActionSoundEffect, mode: SoundMode) -> Result<(), ConfigError> {
        self.store
            .update(|config| set_sound_mode(&mut config.quick_action, effect, mode))
    }

    pub fn preferences(&self) -> Option<QuickActionSoundPreferences> {
        self.store
            .read(|config| build_sound_preferences(Some(config)))
            .flatten()
    }

    /// Start or stop previewing `effect`; resolves to whether it is playing now.
    ///
    /// Always `false` without a desktop host.
    pub async fn preview(&self, effect: QuickActionSoundEffect) -> Result<bool, ConfigError> {
        let preferences = self.preferences().ok_or(ConfigError::NotLoaded)?;
        let Some(backend) = self.store.host().backend() else {
            return Ok(false);
        };

        let result = backend
            .toggle_quick_action_sound_preview(preferences, effect)
            .await;
        match result {
            Ok(CommandResult::Ok { data }) => Ok(data),
            Ok(CommandResult::Error { error }) => {
                Err(self.report("sound.preview_failed", ConfigError::Backend(error)))
            }
            Err(e) => {
                tracing::debug!("Raw transport error: {:?}", e);
                Err(self.report("sound.preview_failed", ConfigError::Transport(e)))
            }
        }
    }

    /// Ask the backend for a sound file and put it in the `effect` slot.
    ///
    /// `Ok(None)` when the picker was dismissed; the slot is left alone.
    pub async fn choose_file(&self, effect: QuickActionSoundEffect) -> Result<Option<String>, ConfigError> {
        let Some(backend) = self.store.host().backend() else {
            return Ok(None);
        };

        let chosen = match backend.choose_quick_action_sound_file().await {
            Ok(CommandResult::Ok { data }) => data,
            Ok(CommandResult::Error { error }) => {
                return Err(self.report("sound.choose_failed", ConfigError::Backend(error)));
            }
            Err(e) => {
                tracing::debug!("Raw transport error: {:?}", e);
                return Err(self.report("sound.choose_failed", ConfigError::Transport(e)));
            }
        };

        if let Some(path) = &chosen {
            self.store
                .update(|config| set_sound_file(&mut config.quick_action, effect, path.clone()))?;
            tracing::info!("{:?} sound set to {}", effect, path);
        }
        Ok(chosen)
    }

    fn report(&self, key: &str, err: ConfigError) -> ConfigError {
        let ctx = self.store.context();
        tracing::error!("Sound command failed: {}", err);
        ctx.notifications
            .error(ctx.t_with(key, &[("error", &err.to_string())]));
        err
    }
}
