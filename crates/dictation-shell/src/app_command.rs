use dictation_core::PermissionKind;

use serde::Deserialize;

/// Commands from the host UI to the application.
///
/// Decoded from `{"type":"ui","action":..}` host messages.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum AppCommand {
    /// The user clicked a window's overlay surface.
    Click {
        /// Label of the clicked window.
        window: String,
    },
    /// Change the global shortcut (None = default).
    SetShortcut {
        /// New shortcut.
        #[serde(default)]
        value: Option<String>,
    },
    /// Return to the default shortcut.
    ResetShortcut,
    /// Report a permission's status.
    CheckPermission {
        /// Permission to query.
        kind: PermissionKind,
    },
    /// Prompt for a permission, then report its status.
    RequestPermission {
        /// Permission to request.
        kind: PermissionKind,
    },
    /// Request application shutdown.
    #[serde(rename = "quit")]
    Shutdown,
}
