//! Message catalog for user-visible text.
//!
//! A built-in English catalog is always present. A locale file
//! `<locale_dir>/<locale>.yaml` (flat `key: text` map) overrides individual keys.
//! Placeholders are written `{name}` and filled by [`Translator::t_with`].

use anyhow::{Context, Result};
use camino::Utf8Path;
use indexmap::IndexMap;
use regex::{Captures, Regex};
use std::fs;
use std::sync::LazyLock;

const BUILTIN_CATALOG: &str = r#"
notification.success_title: "Success"
notification.info_title: "Info"
notification.warning_title: "Warning"
notification.error_title: "Error"
loading.default: "Loading..."
config.refresh_failed: "Failed to load configuration: {error}"
config.save_failed: "Failed to save configuration: {error}"
config.stale: "The configuration changed in the background. Reload before saving."
config.changed_externally: "The configuration was changed in the background while you were editing. Reload to continue; unsaved edits will be lost."
config.reset_confirm_title: "Reset settings"
config.reset_confirm_message: "Restore every setting to its default value?"
config.reset_succeeded: "Settings restored to defaults"
config.reset_failed: "Failed to reset settings: {error}"
common.operation_canceled: "Operation canceled"
device.register_failed: "Failed to read current device: {error}"
device.choose_source_title: "Copy paths for {game} from which device?"
device.paths_copied: "Copied paths for {game} from {device}"
sound.preview_failed: "Failed to preview sound: {error}"
sound.choose_failed: "Failed to choose sound file: {error}"
"#;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([A-Za-z0-9_]+)\}").expect("Invalid placeholder regex")
});

/// Key-to-text lookup for one locale
#[derive(Debug, Clone)]
pub struct Translator {
    locale: String,
    messages: IndexMap<String, String>,
}

impl Translator {
    /// Translator with only the built-in English catalog
    pub fn builtin() -> Self {
        let messages = serde_yaml_ng::from_str(BUILTIN_CATALOG).unwrap_or_else(|e| {
            tracing::error!("Built-in message catalog is malformed: {}", e);
            IndexMap::new()
        });
        Self {
            locale: "en_US".to_string(),
            messages,
        }
    }

    /// Built-in catalog overlaid with `<locale_dir>/<locale>.yaml` when it exists
    pub fn load(locale_dir: &Utf8Path, locale: &str) -> Result<Self> {
        let mut translator = Self::builtin();
        translator.locale = locale.to_string();

        let path = locale_dir.join(format!("{}.yaml", locale));
        if !path.exists() {
            tracing::debug!("No message catalog at {}, using built-in texts", path);
            return Ok(translator);
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read message catalog: {}", path))?;
        let overrides: IndexMap<String, String> = serde_yaml_ng::from_str(&contents)
            .with_context(|| format!("Failed to parse message catalog: {}", path))?;

        tracing::info!("Loaded {} messages for locale {}", overrides.len(), locale);
        translator.messages.extend(overrides);
        Ok(translator)
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Text for `key`, or the key itself when it is unknown
    pub fn t(&self, key: &str) -> String {
        self.messages
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    /// Text for `key` with `{name}` placeholders replaced.
    ///
    /// Placeholders without a matching argument are left as written.
    pub fn t_with(&self, key: &str, args: &[(&str, &str)]) -> String {
        let template = self.t(key);
        PLACEHOLDER
            .replace_all(&template, |caps: &Captures| {
                args.iter()
                    .find(|(name, _)| *name == &caps[1])
                    .map(|(_, value)| value.to_string())
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }
}

impl Default for Translator {
    fn default() -> Self {
        Self::builtin()
    }
}
