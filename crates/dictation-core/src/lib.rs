//! Dictation control layer.
//!
//! Per-window recording session state, kept in sync with an external
//! transcription backend through its event stream, plus the overlay
//! auto-dismiss lifecycle and the shortcut preference transaction.
//!
//! # Example
//!
//! ```no_run
//! use dictation_core::{Backend, SessionWindow, WindowConfig, WindowRole};
//!
//! use std::sync::Arc;
//!
//! async fn open_overlay(backend: Arc<dyn Backend>) {
//!     let config = WindowConfig::new("recording-overlay", WindowRole::Overlay);
//!     let (window, handle) = SessionWindow::open(config, backend).await;
//!     let task = window.spawn();
//!
//!     let mut session = handle.watch();
//!     while session.changed().await.is_ok() {
//!         println!("state: {}", session.borrow().state);
//!     }
//!
//!     let _ = handle.close().await;
//!     let _ = task.await;
//! }
//! ```

mod backend;
mod bridge;
mod error;
pub mod events;
mod overlay;
mod preferences;
mod session;
mod window;

pub use {
    backend::{Backend, BackendCommand, PermissionKind, PermissionStatus, PreferenceStore},
    bridge::{BridgeAction, EventBridge, Subscription},
    error::{BackendError, CoreError, Result as CoreResult},
    events::{RawEvent, SessionEvent},
    overlay::{
        DismissDelays, DismissTrigger, ERROR_DISMISS_DELAY, OverlayController,
        SUCCESS_DISMISS_DELAY,
    },
    preferences::{
        DEFAULT_SHORTCUT, PreferenceTransaction, Severity, ShortcutPreference, ShortcutUpdate,
    },
    session::{RecordingState, SessionSnapshot, SessionStore},
    window::{
        DEFAULT_MAILBOX_CAPACITY, SessionWindow, WindowConfig, WindowHandle, WindowMessage,
        WindowRole,
    },
};

#[cfg(test)]
mod tests;
