//! Boundary to the external transcription backend.
//!
//! The backend is reachable through two channels only: command calls
//! ([`Backend`]) and the push event stream ([`Backend::subscribe`]).
//! Preference persistence is a separate collaborator ([`PreferenceStore`])
//! so the shortcut transaction can compensate across the two.

mod command;
mod permission;

pub use {
    command::BackendCommand,
    permission::{PermissionKind, PermissionStatus},
};

use crate::{BackendError, RawEvent, ShortcutPreference};

use async_trait::async_trait;
use tokio::sync::mpsc;

/// Command calls and event subscription offered by the backend.
///
/// Every call resolves to a success value or a typed [`BackendError`];
/// none of them are cancellable once issued.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Stop the active recording and discard its audio.
    async fn cancel_recording(&self) -> Result<(), BackendError>;

    /// Abort the running transcription. Callers do not wait on the outcome;
    /// the `transcription-cancelled` event drives the resulting transition.
    async fn cancel_transcription(&self) -> Result<(), BackendError>;

    /// Hide the recording overlay window.
    async fn dismiss_overlay(&self) -> Result<(), BackendError>;

    /// Make `shortcut` the active global shortcut. `None` selects the
    /// backend's default.
    async fn register_shortcut(&self, shortcut: Option<&str>) -> Result<(), BackendError>;

    /// Query a system permission without prompting.
    async fn check_permission(
        &self,
        kind: PermissionKind,
    ) -> Result<PermissionStatus, BackendError>;

    /// Prompt for a system permission. Returns whether it is now granted.
    async fn request_permission(&self, kind: PermissionKind) -> Result<bool, BackendError>;

    /// Open a stream carrying the named events, in delivery order.
    ///
    /// The stream ends when the receiver is dropped.
    async fn subscribe(
        &self,
        events: &[&'static str],
    ) -> Result<mpsc::Receiver<RawEvent>, BackendError>;
}

/// Persistent storage for the shortcut preference record.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Write `preference` durably. Errors use the `Load`/`Parse`/`Io` kinds.
    async fn persist(&self, preference: &ShortcutPreference) -> Result<(), BackendError>;
}
