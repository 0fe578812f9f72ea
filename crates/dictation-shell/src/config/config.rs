//! Configuration management for the dictation shell.
//!
//! Handles loading and saving the TOML configuration file with
//! cross-platform paths and atomic write operations. The `[shortcut]`
//! section doubles as the persisted shortcut preference record.

use crate::{
    AppError, AppResult,
    config::{LoggingConfig, OverlayConfig, ShortcutConfig},
};

use std::{
    fs,
    io::Write,
    panic::Location,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Main configuration struct.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Global shortcut preference.
    #[serde(default)]
    pub shortcut: ShortcutConfig,
    /// Recording overlay behaviour.
    #[serde(default)]
    pub overlay: OverlayConfig,
    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from `path`, creating a default file if none exists.
    #[track_caller]
    #[instrument]
    pub fn load_or_create(path: &Path) -> AppResult<Self> {
        if path.exists() {
            Self::load_from(path)
        } else {
            info!("No config found, creating default");
            let config = Config::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Load configuration from `path`. Missing fields take their defaults.
    #[track_caller]
    pub fn load_from(path: &Path) -> AppResult<Self> {
        let contents = fs::read_to_string(path).map_err(|source| AppError::ConfigRead {
            path: path.to_path_buf(),
            source,
            location: ErrorLocation::from(Location::caller()),
        })?;

        let config: Config = toml::from_str(&contents).map_err(|source| AppError::ConfigParse {
            path: path.to_path_buf(),
            source,
            location: ErrorLocation::from(Location::caller()),
        })?;

        debug!(config_path = ?path, "Configuration loaded");

        Ok(config)
    }

    /// Save configuration to `path` using atomic write pattern.
    ///
    /// Writes to a temporary file first, then renames to prevent corruption
    /// if the process crashes during the write.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        let contents = toml::to_string_pretty(self).map_err(|e| AppError::ConfigWrite {
            reason: format!("Failed to serialize config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        // Atomic write: write to temp file then rename
        let temp_path = path.with_extension("toml.tmp");

        let mut temp_file = fs::File::create(&temp_path).map_err(|e| AppError::ConfigWrite {
            reason: format!("Failed to create temp config file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        temp_file
            .write_all(contents.as_bytes())
            .map_err(|e| AppError::ConfigWrite {
                reason: format!("Failed to write temp config file: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        temp_file.sync_all().map_err(|e| AppError::ConfigWrite {
            reason: format!("Failed to sync temp config file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        fs::rename(&temp_path, path).map_err(|e| AppError::ConfigWrite {
            reason: format!("Failed to rename temp config to final: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(config_path = ?path, "Configuration saved (atomic write)");

        Ok(())
    }

    /// Platform config file path, creating its directory if needed.
    #[track_caller]
    pub fn config_path() -> AppResult<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "dictation", "Dictation").ok_or_else(|| {
            AppError::ConfigDirUnavailable {
                location: ErrorLocation::from(Location::caller()),
            }
        })?;

        let config_dir = proj_dirs.config_dir();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
            debug!(config_dir = ?config_dir, "Created config directory");
        }

        Ok(config_dir.join("config.toml"))
    }
}
