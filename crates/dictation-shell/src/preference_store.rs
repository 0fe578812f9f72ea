use crate::{
    AppError, AppResult,
    config::{Config, ShortcutConfig},
};

use dictation_core::{BackendError, PreferenceStore, ShortcutPreference};

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{debug, instrument};

/// Persists the shortcut preference into the `[shortcut]` section of the
/// config file, leaving every other section as it is on disk.
#[derive(Debug, Clone)]
pub struct ConfigPreferenceStore {
    path: PathBuf,
}

impl ConfigPreferenceStore {
    /// Store backed by the config file at `path`.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn write(&self, preference: &ShortcutPreference) -> AppResult<()> {
        let mut config = if self.path.exists() {
            Config::load_from(&self.path)?
        } else {
            Config::default()
        };

        config.shortcut = ShortcutConfig::from(preference);
        config.save_to(&self.path)
    }
}

#[async_trait]
impl PreferenceStore for ConfigPreferenceStore {
    #[instrument(skip(self, preference), fields(path = ?self.path))]
    async fn persist(&self, preference: &ShortcutPreference) -> Result<(), BackendError> {
        let store = self.clone();
        let preference = preference.clone();

        let result = tokio::task::spawn_blocking(move || store.write(&preference))
            .await
            .map_err(|e| BackendError::Io {
                reason: format!("preference write task failed: {e}"),
            })?;

        result.map_err(|e| {
            debug!(error = ?e, "Persisting shortcut preference failed");
            to_backend_error(e)
        })
    }
}

fn to_backend_error(error: AppError) -> BackendError {
    match error {
        AppError::ConfigRead { source, .. } => BackendError::Load {
            reason: source.to_string(),
        },
        AppError::ConfigParse { source, .. } => BackendError::Parse {
            reason: source.message().to_string(),
        },
        other => BackendError::Io {
            reason: other.to_string(),
        },
    }
}
