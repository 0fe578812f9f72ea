use crate::config::default_shortcut;

use dictation_core::ShortcutPreference;

use serde::{Deserialize, Serialize};

/// Global shortcut preference as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortcutConfig {
    /// User's choice (None = default shortcut).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<String>,

    /// Shortcut used when no choice has been made.
    #[serde(default = "default_shortcut")]
    pub default: String,
}

impl Default for ShortcutConfig {
    fn default() -> Self {
        Self {
            current: None,
            default: default_shortcut(),
        }
    }
}

impl From<&ShortcutConfig> for ShortcutPreference {
    fn from(config: &ShortcutConfig) -> Self {
        ShortcutPreference::new(config.current.clone(), config.default.clone())
    }
}

impl From<&ShortcutPreference> for ShortcutConfig {
    fn from(preference: &ShortcutPreference) -> Self {
        Self {
            current: preference.current_value.clone(),
            default: preference.default_value.clone(),
        }
    }
}
