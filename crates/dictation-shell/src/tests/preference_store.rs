use crate::{ConfigPreferenceStore, config::Config};

use dictation_core::{BackendError, PreferenceStore, ShortcutPreference};

use std::fs;

use tempfile::TempDir;

/// WHAT: Persisting rewrites the shortcut and keeps other sections
/// WHY: The preference record shares the file with unrelated settings
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_existing_config_when_persisting_then_only_shortcut_changes() {
    // Given: A config with a custom overlay delay
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    let mut config = Config::default();
    config.overlay.success_dismiss_ms = 700;
    config.save_to(&path).unwrap();
    let store = ConfigPreferenceStore::new(path.clone());

    // When: Persisting a new shortcut
    let preference = ShortcutPreference::new(Some("Alt+D".to_string()), "Ctrl+Space");
    store.persist(&preference).await.unwrap();

    // Then: The shortcut is stored and the overlay setting survives
    let reloaded = Config::load_from(&path).unwrap();
    assert_eq!(reloaded.shortcut.current.as_deref(), Some("Alt+D"));
    assert_eq!(reloaded.shortcut.default, "Ctrl+Space");
    assert_eq!(reloaded.overlay.success_dismiss_ms, 700);
}

/// WHAT: Persisting without a config file creates one
/// WHY: The preference may be saved before any other setting
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_no_config_when_persisting_then_file_created() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    let store = ConfigPreferenceStore::new(path.clone());

    store.persist(&ShortcutPreference::default()).await.unwrap();

    assert_eq!(Config::load_from(&path).unwrap(), Config::default());
}

/// WHAT: A corrupt config file fails with a parse error
/// WHY: The transaction rolls back and the user sees why
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_corrupt_config_when_persisting_then_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "shortcut = [").unwrap();
    let store = ConfigPreferenceStore::new(path.clone());

    let result = store.persist(&ShortcutPreference::default()).await;

    assert!(matches!(result, Err(BackendError::Parse { .. })));
    assert_eq!(fs::read_to_string(&path).unwrap(), "shortcut = [");
}

/// WHAT: An unwritable location fails with an IO error
/// WHY: Write failures are their own error kind
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_missing_directory_when_persisting_then_io_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("gone").join("config.toml");
    let store = ConfigPreferenceStore::new(path);

    let result = store.persist(&ShortcutPreference::default()).await;

    assert!(matches!(result, Err(BackendError::Io { .. })));
}

/// WHAT: A path that cannot be read fails with a load error
/// WHY: Read failures are their own error kind
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_directory_in_place_of_file_when_persisting_then_load_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::create_dir(&path).unwrap();
    let store = ConfigPreferenceStore::new(path);

    let result = store.persist(&ShortcutPreference::default()).await;

    assert!(matches!(result, Err(BackendError::Load { .. })));
}
