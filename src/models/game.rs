use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Identifier of a registered machine.
pub type DeviceId = String;

/// A registered machine identity used to key per-machine path overrides.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    pub name: String,
}

impl Device {
    /// Label shown when asking the user to pick a device.
    pub fn label(&self) -> String {
        if self.name.is_empty() {
            self.id.clone()
        } else {
            format!("{} ({})", self.name, self.id)
        }
    }
}

/// A save unit is either a single file or a whole folder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SaveUnitType {
    File,
    Folder,
}

/// One file-or-folder save location, recorded per device.
///
/// `paths` holds at most one path per device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveUnit {
    pub unit_type: SaveUnitType,
    #[serde(default)]
    pub paths: IndexMap<DeviceId, String>,
    #[serde(default)]
    pub delete_before_apply: bool,
}

impl SaveUnit {
    pub fn new(unit_type: SaveUnitType) -> Self {
        Self {
            unit_type,
            paths: IndexMap::new(),
            delete_before_apply: false,
        }
    }

    /// Builder-style helper used when assembling units in code and tests.
    pub fn with_path(mut self, device: impl Into<DeviceId>, path: impl Into<String>) -> Self {
        self.paths.insert(device.into(), path.into());
        self
    }

    /// Path recorded for `device`, if any and non-empty.
    pub fn path_for_device(&self, device: &str) -> Option<&str> {
        non_empty(self.paths.get(device))
    }
}

/// A game: its save units plus a launch path per device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub name: String,
    pub save_paths: Vec<SaveUnit>,
    #[serde(default)]
    pub game_paths: IndexMap<DeviceId, String>,
}

impl Game {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            save_paths: Vec::new(),
            game_paths: IndexMap::new(),
        }
    }

    /// Launch path recorded for `device`, if any and non-empty.
    pub fn game_path_for_device(&self, device: &str) -> Option<&str> {
        non_empty(self.game_paths.get(device))
    }

    /// Case-insensitive name comparison used for the uniqueness invariant.
    pub fn has_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|p| !p.trim().is_empty())
}
