//! Per-window recording session state.
//!
//! The store is the single source of truth for one window. It is owned by
//! that window's task and mutated only through the named transitions below,
//! which keep two invariants:
//!
//! - `state == Error` exactly when `error` is set.
//! - `transcription_result` is only set while `state == Done`.
//!
//! Every mutation publishes a [`SessionSnapshot`] on a `watch` channel so
//! the window's UI can re-render. Nothing is shared across windows.

use crate::{BackendError, RecordingState};

use serde::Serialize;
use tokio::sync::watch;
use tracing::trace;

/// Read-only copy of a window's session, as rendered by its UI.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionSnapshot {
    /// Current session state.
    pub state: RecordingState,
    /// Structured failure, set exactly when `state` is `Error`.
    pub error: Option<BackendError>,
    /// Transcribed text of a completed session.
    pub transcription_result: Option<String>,
    /// Whether the overlay is showing. Independent of `state`.
    pub overlay_visible: bool,
}

/// Recording session state for one window.
#[derive(Debug)]
pub struct SessionStore {
    session: SessionSnapshot,
    publisher: watch::Sender<SessionSnapshot>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    /// Create an idle session with the overlay hidden.
    pub fn new() -> Self {
        let (publisher, _) = watch::channel(SessionSnapshot::default());
        Self {
            session: SessionSnapshot::default(),
            publisher,
        }
    }

    /// Subscribe to snapshots of this store.
    pub fn watch(&self) -> watch::Receiver<SessionSnapshot> {
        self.publisher.subscribe()
    }

    /// Current state.
    pub fn state(&self) -> RecordingState {
        self.session.state
    }

    /// Current structured error, if any.
    pub fn error(&self) -> Option<&BackendError> {
        self.session.error.as_ref()
    }

    /// Text of the completed transcription, if any.
    pub fn transcription_result(&self) -> Option<&str> {
        self.session.transcription_result.as_deref()
    }

    /// Whether the overlay is showing.
    pub fn overlay_visible(&self) -> bool {
        self.session.overlay_visible
    }

    /// Borrow the whole session.
    pub fn snapshot(&self) -> &SessionSnapshot {
        &self.session
    }

    /// Move to `state`.
    ///
    /// Any non-error state clears the error. Entering `Error` without a
    /// payload records [`BackendError::unreported`]. Any state other than
    /// `Done` clears the transcription result.
    pub fn set_recording_state(&mut self, state: RecordingState) {
        match state {
            RecordingState::Error => {
                if self.session.error.is_none() {
                    self.session.error = Some(BackendError::unreported());
                }
            }
            _ => self.session.error = None,
        }

        if state != RecordingState::Done {
            self.session.transcription_result = None;
        }

        self.session.state = state;
        self.publish();
    }

    /// Record a failure. Also forces `state` to `Error`.
    pub fn set_error(&mut self, error: BackendError) {
        self.session.error = Some(error);
        self.session.state = RecordingState::Error;
        self.session.transcription_result = None;
        self.publish();
    }

    /// Drop the failure. An `Error` state falls back to `Idle`.
    pub fn clear_error(&mut self) {
        self.session.error = None;
        if self.session.state == RecordingState::Error {
            self.session.state = RecordingState::Idle;
        }
        self.publish();
    }

    /// Record the transcribed text. A result only exists alongside `Done`,
    /// so this also moves the session there.
    pub fn set_transcription_result(&mut self, text: String) {
        self.session.transcription_result = Some(text);
        self.session.error = None;
        self.session.state = RecordingState::Done;
        self.publish();
    }

    /// Drop the transcribed text.
    pub fn clear_transcription_result(&mut self) {
        self.session.transcription_result = None;
        self.publish();
    }

    /// Mark the overlay as showing.
    pub fn show_overlay(&mut self) {
        self.session.overlay_visible = true;
        self.publish();
    }

    /// Mark the overlay as hidden.
    pub fn hide_overlay(&mut self) {
        self.session.overlay_visible = false;
        self.publish();
    }

    /// End the session: no error, no result, `Idle`, overlay hidden.
    pub fn reset(&mut self) {
        self.session = SessionSnapshot::default();
        self.publish();
    }

    fn publish(&self) {
        let next = &self.session;
        let changed = self.publisher.send_if_modified(|current| {
            if current == next {
                false
            } else {
                *current = next.clone();
                true
            }
        });

        if changed {
            trace!(state = %next.state, overlay_visible = next.overlay_visible, "Session updated");
        }
    }
}
