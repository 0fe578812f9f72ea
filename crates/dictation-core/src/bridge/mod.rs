//! Translates backend session events into store transitions.
//!
//! One bridge exists per window. Each event maps to exactly one transition
//! on that window's [`SessionStore`]; windows never affect each other here.

mod subscription;

pub use subscription::Subscription;

use crate::{
    Backend, CoreError, CoreResult, RecordingState, SessionEvent, SessionStore, WindowMessage,
    events::SESSION_EVENTS,
};

use std::panic::Location;

use error_location::ErrorLocation;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

/// Follow-up a window must run after an event has been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeAction {
    /// Nothing further.
    None,
    /// Run the overlay dismiss routine (issues the dismiss command).
    Dismiss,
}

/// Event-to-mutation mapping for one window.
#[derive(Debug)]
pub struct EventBridge {
    window: String,
    /// State set by a specific event during the current processing tick.
    tick_specific: Option<RecordingState>,
}

impl EventBridge {
    /// Create a bridge for the window labelled `window`.
    pub fn new(window: impl Into<String>) -> Self {
        Self {
            window: window.into(),
            tick_specific: None,
        }
    }

    /// Subscribe to the session events and forward them into `mailbox`.
    ///
    /// The returned guard must live as long as the window.
    #[track_caller]
    pub fn subscribe<'a>(
        &'a self,
        backend: &'a dyn Backend,
        mailbox: mpsc::WeakSender<WindowMessage>,
    ) -> impl Future<Output = CoreResult<Subscription>> + 'a {
        let location = ErrorLocation::from(Location::caller());
        self.subscribe_from(backend, mailbox, location)
    }

    #[instrument(skip(self, backend, mailbox, location), fields(window = %self.window))]
    async fn subscribe_from(
        &self,
        backend: &dyn Backend,
        mailbox: mpsc::WeakSender<WindowMessage>,
        location: ErrorLocation,
    ) -> CoreResult<Subscription> {
        let events = backend
            .subscribe(&SESSION_EVENTS)
            .await
            .map_err(|source| CoreError::SubscriptionFailed {
                window: self.window.clone(),
                source,
                location,
            })?;

        info!(events = SESSION_EVENTS.len(), "Subscribed to session events");

        Ok(Subscription::start(self.window.clone(), events, mailbox))
    }

    /// Start a new processing tick. Called when the window picks up a
    /// message after its mailbox ran empty.
    pub fn begin_tick(&mut self) {
        self.tick_specific = None;
    }

    /// Apply one event to `store`.
    pub fn apply(&mut self, store: &mut SessionStore, event: &SessionEvent) -> BridgeAction {
        debug!(window = %self.window, event = event.name(), state = %store.state(), "Applying event");

        match event {
            SessionEvent::RecordingStarted { .. } => {
                // Leaving the error state clears the previous failure.
                store.set_recording_state(RecordingState::Recording);
                self.specific(RecordingState::Recording);
            }
            SessionEvent::RecordingStopped {
                duration_ms,
                sample_count,
            } => {
                debug!(duration_ms, sample_count, "Recording stopped");
                store.set_recording_state(RecordingState::Transcribing);
                self.specific(RecordingState::Transcribing);
            }
            SessionEvent::RecordingFailed { error } => {
                warn!(window = %self.window, error = %error, "Recording failed");
                store.set_error(error.clone());
                store.show_overlay();
                self.specific(RecordingState::Error);
            }
            SessionEvent::TranscriptionStarted { .. } => {}
            SessionEvent::TranscriptionComplete { text, duration_ms } => {
                debug!(duration_ms, text_len = text.len(), "Transcription complete");
                store.set_transcription_result(text.clone());
                self.specific(RecordingState::Done);
            }
            SessionEvent::TranscriptionFailed { error } => {
                warn!(window = %self.window, error = %error, "Transcription failed");
                store.set_error(error.clone());
                self.specific(RecordingState::Error);
            }
            SessionEvent::TranscriptionCancelled { .. } => {
                store.clear_transcription_result();
                store.set_recording_state(RecordingState::Idle);
                store.hide_overlay();
                self.specific(RecordingState::Idle);
                return BridgeAction::Dismiss;
            }
            SessionEvent::OverlayShown => {
                store.show_overlay();
                store.set_recording_state(RecordingState::Recording);
                self.specific(RecordingState::Recording);
            }
            SessionEvent::OverlayDismissed | SessionEvent::RecordingCancelled => {
                store.hide_overlay();
                store.set_recording_state(RecordingState::Idle);
                self.specific(RecordingState::Idle);
            }
            SessionEvent::StateChanged { state } => self.apply_generic(store, state),
        }

        BridgeAction::None
    }

    // Catch-all path. Loses to any specific event in the same tick, and
    // never replaces a structured error with the placeholder.
    fn apply_generic(&mut self, store: &mut SessionStore, label: &str) {
        let Some(state) = RecordingState::from_label(label) else {
            warn!(window = %self.window, state = label, "Ignoring unknown recording state");
            return;
        };

        if let Some(specific) = self.tick_specific
            && specific != state
        {
            debug!(
                window = %self.window,
                generic = %state,
                specific = %specific,
                "Generic state change superseded by specific event"
            );
            return;
        }

        if state == RecordingState::Error && store.error().is_some() {
            return;
        }

        store.set_recording_state(state);
    }

    fn specific(&mut self, state: RecordingState) {
        self.tick_specific = Some(state);
    }
}
