// Application settings
//
// Distinct from the configuration document: these control the shell itself
// (log location, which file the local backend uses, toast pacing). Layered
// from an optional `rgsm.yaml` and `RGSM_*` environment variables, the latter
// winning, e.g. `RGSM_NOTIFICATION_GAP_MS=250`. Nested keys would use `__`.

use crate::models::Device;
use crate::services::NotificationSettings;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use std::time::Duration;

/// Settings file looked up in the working directory
pub const SETTINGS_FILE: &str = "rgsm.yaml";

/// Prefix of the environment variables read by [`AppSettings::load`]
pub const ENV_PREFIX: &str = "RGSM";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub log_dir: Utf8PathBuf,
    pub debug_mode: bool,
    pub console_log: bool,
    /// JSON document served by the local backend
    pub config_file: Utf8PathBuf,
    /// Empty means use the machine id
    pub device_id: String,
    pub device_name: String,
    pub notification_gap_ms: u64,
    pub notification_duration_ms: u64,
    /// Directory of `<locale>.yaml` message catalogs
    pub locale_dir: Option<Utf8PathBuf>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            log_dir: Utf8PathBuf::from("logs"),
            debug_mode: false,
            console_log: true,
            config_file: Utf8PathBuf::from("GameSaveManager.config.json"),
            device_id: String::new(),
            device_name: system_hostname(),
            notification_gap_ms: 100,
            notification_duration_ms: 3000,
            locale_dir: None,
        }
    }
}

impl AppSettings {
    /// Load from `rgsm.yaml` in the working directory and the environment
    pub fn load() -> Result<Self> {
        Self::load_from(Utf8Path::new(SETTINGS_FILE))
    }

    /// Load from `path` (if it exists) and the environment
    pub fn load_from(path: &Utf8Path) -> Result<Self> {
        Self::build(path, None)
    }

    /// `vars` replaces the process environment when given
    fn build(path: &Utf8Path, vars: Option<::config::Map<String, String>>) -> Result<Self> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::with_name(path.as_str()).required(false))
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(vars),
            )
            .build()
            .with_context(|| format!("Failed to read settings from {}", path))?;

        let settings: Self = settings
            .try_deserialize()
            .context("Invalid application settings")?;

        tracing::debug!("Application settings: {:?}", settings);
        Ok(settings)
    }

    pub fn notification_settings(&self) -> NotificationSettings {
        NotificationSettings {
            gap: Duration::from_millis(self.notification_gap_ms),
            default_duration: Duration::from_millis(self.notification_duration_ms),
        }
    }

    /// Identity reported by the local backend
    ///
    /// Without a configured `device_id` the machine id is used, so every
    /// machine gets its own key in the per-device path maps.
    pub fn device(&self) -> Result<Device> {
        let id = if self.device_id.trim().is_empty() {
            machine_uid::get().map_err(|e| anyhow::anyhow!("Failed to read machine id: {}", e))?
        } else {
            self.device_id.clone()
        };

        Ok(Device {
            id,
            name: self.device_name.clone(),
        })
    }
}

fn system_hostname() -> String {
    hostname::get()
        .ok()
        .and_then(|name| name.into_string().ok())
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| "Unknown Device".to_string())
}
