//! Overlay lifecycle: auto-dismiss timers and user dismissal.
//!
//! Terminal states (`done`, `error`) arm a single dismiss timer; active
//! states cancel it. Clicks, timers and backend cancellations all funnel
//! into [`OverlayController::dismiss`], which invalidates the timer first
//! and issues at most one dismiss command per session cycle.

mod timer;

use timer::DismissTimer;

use crate::{
    Backend, BackendCommand, CoreError, CoreResult, RecordingState, SessionStore, WindowMessage,
};

use std::{panic::Location, sync::Arc, time::Duration};

use error_location::ErrorLocation;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Delay before a successful session auto-dismisses.
pub const SUCCESS_DISMISS_DELAY: Duration = Duration::from_millis(1200);

/// Delay before a failed session auto-dismisses. Longer so the message can be read.
pub const ERROR_DISMISS_DELAY: Duration = Duration::from_millis(1800);

/// Auto-dismiss delays per terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DismissDelays {
    /// Delay after `done`.
    pub success: Duration,
    /// Delay after `error`.
    pub error: Duration,
}

impl Default for DismissDelays {
    fn default() -> Self {
        Self {
            success: SUCCESS_DISMISS_DELAY,
            error: ERROR_DISMISS_DELAY,
        }
    }
}

/// What caused a dismissal. Logged only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissTrigger {
    /// The user clicked the overlay.
    Click,
    /// The auto-dismiss timer elapsed.
    Timer,
    /// The backend reported a cancelled transcription.
    Cancellation,
}

/// Owns the auto-dismiss timer of an overlay window.
pub struct OverlayController {
    backend: Arc<dyn Backend>,
    mailbox: mpsc::WeakSender<WindowMessage>,
    delays: DismissDelays,
    timer: Option<DismissTimer>,
    generation: u64,
    cycle: Uuid,
    dismissed: bool,
}

impl OverlayController {
    /// Create a controller whose timers post into `mailbox`.
    pub fn new(
        backend: Arc<dyn Backend>,
        mailbox: mpsc::WeakSender<WindowMessage>,
        delays: DismissDelays,
    ) -> Self {
        Self {
            backend,
            mailbox,
            delays,
            timer: None,
            generation: 0,
            cycle: Uuid::new_v4(),
            dismissed: false,
        }
    }

    /// Delay of the pending timer, if one is armed.
    pub fn pending_delay(&self) -> Option<Duration> {
        self.timer.as_ref().map(|timer| timer.delay)
    }

    /// Arm or cancel the timer to match the store's current state.
    ///
    /// Call after every store mutation. Re-running it in the same state
    /// keeps the running timer.
    pub fn reconcile(&mut self, store: &SessionStore) {
        let state = store.state();

        if state != RecordingState::Idle && self.dismissed {
            self.dismissed = false;
            self.cycle = Uuid::new_v4();
            debug!(cycle = %self.cycle, state = %state, "New overlay cycle");
        }

        match state {
            RecordingState::Done => self.arm(state, self.delays.success),
            RecordingState::Error => self.arm(state, self.delays.error),
            RecordingState::Idle | RecordingState::Recording | RecordingState::Transcribing => {
                if self.cancel_timer() {
                    debug!(cycle = %self.cycle, state = %state, "Auto-dismiss cancelled");
                }
            }
        }
    }

    /// Handle an elapsed timer. Stale generations are ignored.
    pub async fn on_timer_elapsed(
        &mut self,
        generation: u64,
        store: &mut SessionStore,
    ) -> CoreResult<bool> {
        match &self.timer {
            Some(timer) if timer.generation == generation => {}
            _ => {
                debug!(generation, "Ignoring stale dismiss timer");
                return Ok(false);
            }
        }

        self.dismiss(store, DismissTrigger::Timer).await
    }

    /// Handle a click on the overlay.
    ///
    /// Recording: cancel the recording; the overlay stays until the
    /// `recording-cancelled` event. Transcribing: request cancellation
    /// without waiting. Otherwise: dismiss now.
    #[track_caller]
    pub fn click<'a>(
        &'a mut self,
        store: &'a mut SessionStore,
    ) -> impl Future<Output = CoreResult<()>> + 'a {
        let location = ErrorLocation::from(Location::caller());
        self.click_from(store, location)
    }

    #[instrument(skip(self, store, location), fields(state = %store.state()))]
    async fn click_from(
        &mut self,
        store: &mut SessionStore,
        location: ErrorLocation,
    ) -> CoreResult<()> {
        match store.state() {
            RecordingState::Recording => {
                info!(cycle = %self.cycle, "Cancelling recording from overlay");
                self.backend.cancel_recording().await.map_err(|source| {
                    CoreError::CommandFailed {
                        command: BackendCommand::CancelRecording.as_str(),
                        source,
                        location,
                    }
                })
            }
            RecordingState::Transcribing => {
                info!(cycle = %self.cycle, "Cancelling transcription from overlay");
                let backend = Arc::clone(&self.backend);
                tokio::spawn(async move {
                    if let Err(e) = backend.cancel_transcription().await {
                        warn!(error = %e, "cancel-transcription failed");
                    }
                });
                Ok(())
            }
            RecordingState::Done | RecordingState::Error | RecordingState::Idle => {
                self.dismiss_from(store, DismissTrigger::Click, location)
                    .await
                    .map(|_| ())
            }
        }
    }

    /// Reset the session and hide the overlay.
    ///
    /// Safe to call repeatedly: the timer is invalidated first, and only the
    /// first call of a cycle issues the dismiss command. Returns whether the
    /// command was issued. The store is reset before the command is sent,
    /// whatever its outcome.
    #[track_caller]
    pub fn dismiss<'a>(
        &'a mut self,
        store: &'a mut SessionStore,
        trigger: DismissTrigger,
    ) -> impl Future<Output = CoreResult<bool>> + 'a {
        let location = ErrorLocation::from(Location::caller());
        self.dismiss_from(store, trigger, location)
    }

    async fn dismiss_from(
        &mut self,
        store: &mut SessionStore,
        trigger: DismissTrigger,
        location: ErrorLocation,
    ) -> CoreResult<bool> {
        self.cancel_timer();
        store.reset();

        if self.dismissed {
            debug!(cycle = %self.cycle, ?trigger, "Overlay already dismissed this cycle");
            return Ok(false);
        }
        self.dismissed = true;

        info!(cycle = %self.cycle, ?trigger, "Dismissing overlay");

        self.backend
            .dismiss_overlay()
            .await
            .map_err(|source| CoreError::CommandFailed {
                command: BackendCommand::DismissOverlay.as_str(),
                source,
                location,
            })?;

        Ok(true)
    }

    /// Tear down: cancel any pending timer unconditionally.
    pub fn unmount(&mut self) {
        if self.cancel_timer() {
            debug!(cycle = %self.cycle, "Pending auto-dismiss cancelled on unmount");
        }
    }

    fn arm(&mut self, state: RecordingState, delay: Duration) {
        if self
            .timer
            .as_ref()
            .is_some_and(|timer| timer.armed_for == state)
        {
            return;
        }

        self.cancel_timer();
        self.generation += 1;
        self.timer = Some(DismissTimer::arm(
            delay,
            self.generation,
            state,
            self.mailbox.clone(),
        ));

        debug!(
            cycle = %self.cycle,
            state = %state,
            delay_ms = delay.as_millis(),
            generation = self.generation,
            "Auto-dismiss armed"
        );
    }

    fn cancel_timer(&mut self) -> bool {
        self.timer.take().is_some()
    }
}

impl Drop for OverlayController {
    fn drop(&mut self) {
        self.unmount();
    }
}
