use crate::config::ConfigError;
use crate::models::game::{Device, DeviceId, Game};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The configuration document held by the backend.
///
/// Contains the version, backup location, registered games and devices,
/// user settings, the favorites tree and quick-action preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub version: String,
    pub backup_path: String,
    pub games: Vec<Game>,
    pub settings: Settings,
    #[serde(default)]
    pub favorites: Vec<FavoriteTreeNode>,
    #[serde(default)]
    pub quick_action: QuickActionsSettings,
    #[serde(default)]
    pub devices: IndexMap<DeviceId, Device>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            backup_path: "./save_data".to_string(),
            games: Vec::new(),
            settings: Settings {
                prompt_when_not_described: false,
                ..Settings::default()
            },
            favorites: Vec::new(),
            quick_action: QuickActionsSettings::default(),
            devices: IndexMap::new(),
        }
    }
}

impl Config {
    /// Find a game by name, ignoring case
    pub fn find_game(&self, name: &str) -> Option<&Game> {
        self.games.iter().find(|g| g.has_name(name))
    }

    /// Find a game by name for mutation, ignoring case
    pub fn find_game_mut(&mut self, name: &str) -> Option<&mut Game> {
        self.games.iter_mut().find(|g| g.has_name(name))
    }

    /// Append a game, keeping names unique (case-insensitive).
    pub fn add_game(&mut self, game: Game) -> Result<(), ConfigError> {
        if self.find_game(&game.name).is_some() {
            return Err(ConfigError::DuplicateGame(game.name));
        }
        self.games.push(game);
        Ok(())
    }

    /// Display label for a device id, falling back to the bare id.
    pub fn device_label(&self, id: &str) -> String {
        self.devices
            .get(id)
            .map(Device::label)
            .unwrap_or_else(|| id.to_string())
    }
}

/// How the snapshot list is expanded when a game page opens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveListExpandBehavior {
    AlwaysOpen,
    #[default]
    AlwaysClosed,
    RememberLast,
}

/// Flat map of user preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_true")]
    pub prompt_when_not_described: bool,
    #[serde(default = "default_true")]
    pub extra_backup_when_apply: bool,
    #[serde(default)]
    pub show_edit_button: bool,
    #[serde(default = "default_true")]
    pub prompt_when_auto_backup: bool,
    #[serde(default = "default_true")]
    pub exit_to_tray: bool,
    #[serde(default)]
    pub cloud_settings: CloudSettings,
    #[serde(default = "default_locale")]
    pub locale: String,
    #[serde(default)]
    pub default_delete_before_apply: bool,
    #[serde(default)]
    pub default_expend_favorites_tree: bool,
    #[serde(default = "default_home_page")]
    pub home_page: String,
    #[serde(default = "default_true")]
    pub log_to_file: bool,
    #[serde(default)]
    pub add_new_to_favorites: bool,
    #[serde(default)]
    pub save_list_expand_behavior: SaveListExpandBehavior,
    #[serde(default)]
    pub save_list_last_expanded: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            prompt_when_not_described: true,
            extra_backup_when_apply: true,
            show_edit_button: false,
            prompt_when_auto_backup: true,
            exit_to_tray: true,
            cloud_settings: CloudSettings::default(),
            locale: default_locale(),
            default_delete_before_apply: false,
            default_expend_favorites_tree: false,
            home_page: default_home_page(),
            log_to_file: true,
            add_new_to_favorites: false,
            save_list_expand_behavior: SaveListExpandBehavior::default(),
            save_list_last_expanded: false,
        }
    }
}

/// Cloud synchronisation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudSettings {
    #[serde(default)]
    pub always_sync: bool,
    #[serde(default = "default_cloud_root")]
    pub root_path: String,
    #[serde(default)]
    pub backend: CloudBackend,
}

impl Default for CloudSettings {
    fn default() -> Self {
        Self {
            always_sync: false,
            root_path: default_cloud_root(),
            backend: CloudBackend::Disabled,
        }
    }
}

/// Remote storage used for cloud sync
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CloudBackend {
    #[default]
    Disabled,
    WebDAV {
        endpoint: String,
        username: String,
        password: String,
    },
    S3 {
        endpoint: String,
        bucket: String,
        region: String,
        access_key_id: String,
        secret_access_key: String,
    },
}

impl CloudBackend {
    /// Short name used in logs; never includes credentials.
    pub fn describe(&self) -> String {
        match self {
            CloudBackend::Disabled => "disabled".to_string(),
            CloudBackend::WebDAV { endpoint, .. } => format!("webdav:{}", endpoint),
            CloudBackend::S3 {
                endpoint, bucket, ..
            } => format!("s3:{}/{}", endpoint, bucket),
        }
    }
}

/// Node of the favorites tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteTreeNode {
    pub node_id: String,
    pub label: String,
    pub is_leaf: bool,
    pub children: Option<Vec<FavoriteTreeNode>>,
}

/// Hotkey bindings for quick actions; each is a key chord split into parts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickActionHotkeys {
    pub apply: Vec<String>,
    pub backup: Vec<String>,
}

impl Default for QuickActionHotkeys {
    fn default() -> Self {
        Self {
            apply: vec![String::new(); 3],
            backup: vec![String::new(); 3],
        }
    }
}

/// Where a quick-action sound effect comes from
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuickActionSoundSource {
    #[default]
    Default,
    File { path: String },
}

/// Which quick-action outcome a sound belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuickActionSoundEffect {
    Success,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QuickActionSoundSlots {
    #[serde(default)]
    pub success: QuickActionSoundSource,
    #[serde(default)]
    pub failure: QuickActionSoundSource,
}

impl QuickActionSoundSlots {
    pub fn slot(&self, effect: QuickActionSoundEffect) -> &QuickActionSoundSource {
        match effect {
            QuickActionSoundEffect::Success => &self.success,
            QuickActionSoundEffect::Failure => &self.failure,
        }
    }

    pub fn slot_mut(&mut self, effect: QuickActionSoundEffect) -> &mut QuickActionSoundSource {
        match effect {
            QuickActionSoundEffect::Success => &mut self.success,
            QuickActionSoundEffect::Failure => &mut self.failure,
        }
    }
}

/// Value submitted to the backend for sound preview and playback
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickActionSoundPreferences {
    pub enable_sound: bool,
    pub sounds: QuickActionSoundSlots,
}

/// Quick-action preferences.
///
/// The flags and sound slots are optional because documents written by
/// older versions may omit them; see
/// [`ensure_quick_action_defaults`](crate::services::sound_prefs::ensure_quick_action_defaults).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QuickActionsSettings {
    #[serde(default)]
    pub quick_action_game: Option<Game>,
    #[serde(default)]
    pub hotkeys: QuickActionHotkeys,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_sound: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_notification: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sounds: Option<QuickActionSoundSlots>,
}

fn default_true() -> bool {
    true
}

fn default_locale() -> String {
    "en_US".to_string()
}

fn default_home_page() -> String {
    "/home".to_string()
}

fn default_cloud_root() -> String {
    "/game-save-manager".to_string()
}
