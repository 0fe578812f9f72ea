//! Scripted backend and preference store for tests.

use crate::{
    Backend, BackendError, PermissionKind, PermissionStatus, PreferenceStore, RawEvent,
    ShortcutPreference,
};

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard},
};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;

/// A command call seen by [`MockBackend`].
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    CancelRecording,
    CancelTranscription,
    DismissOverlay,
    RegisterShortcut(Option<String>),
    CheckPermission(PermissionKind),
    RequestPermission(PermissionKind),
    Subscribe(usize),
}

#[derive(Default)]
struct MockState {
    calls: Vec<Call>,
    register_results: VecDeque<Result<(), BackendError>>,
    cancel_recording_result: Option<BackendError>,
    dismiss_result: Option<BackendError>,
    subscribe_error: Option<BackendError>,
    subscribers: Vec<mpsc::Sender<RawEvent>>,
}

/// Records every call; results are scripted.
#[derive(Default)]
pub(crate) struct MockBackend {
    state: Mutex<MockState>,
}

impl MockBackend {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    pub(crate) fn count(&self, call: &Call) -> usize {
        self.state().calls.iter().filter(|c| *c == call).count()
    }

    /// Queue results for successive `register_shortcut` calls. Unscripted calls succeed.
    pub(crate) fn script_register(&self, results: Vec<Result<(), BackendError>>) {
        self.state().register_results.extend(results);
    }

    pub(crate) fn fail_cancel_recording(&self, error: BackendError) {
        self.state().cancel_recording_result = Some(error);
    }

    pub(crate) fn fail_dismiss(&self, error: BackendError) {
        self.state().dismiss_result = Some(error);
    }

    pub(crate) fn fail_subscribe(&self, error: BackendError) {
        self.state().subscribe_error = Some(error);
    }

    /// Deliver an event to every subscriber, as the backend does for all windows.
    pub(crate) async fn emit(&self, name: &str, payload: Value) {
        let subscribers = self.state().subscribers.clone();
        for subscriber in subscribers {
            let _ = subscriber.send(RawEvent::new(name, payload.clone())).await;
        }
    }

    pub(crate) fn subscriber_count(&self) -> usize {
        self.state()
            .subscribers
            .iter()
            .filter(|s| !s.is_closed())
            .count()
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn cancel_recording(&self) -> Result<(), BackendError> {
        let mut state = self.state();
        state.calls.push(Call::CancelRecording);
        state.cancel_recording_result.clone().map_or(Ok(()), Err)
    }

    async fn cancel_transcription(&self) -> Result<(), BackendError> {
        self.state().calls.push(Call::CancelTranscription);
        Ok(())
    }

    async fn dismiss_overlay(&self) -> Result<(), BackendError> {
        let mut state = self.state();
        state.calls.push(Call::DismissOverlay);
        state.dismiss_result.clone().map_or(Ok(()), Err)
    }

    async fn register_shortcut(&self, shortcut: Option<&str>) -> Result<(), BackendError> {
        let mut state = self.state();
        state
            .calls
            .push(Call::RegisterShortcut(shortcut.map(str::to_string)));
        state.register_results.pop_front().unwrap_or(Ok(()))
    }

    async fn check_permission(
        &self,
        kind: PermissionKind,
    ) -> Result<PermissionStatus, BackendError> {
        self.state().calls.push(Call::CheckPermission(kind));
        Ok(PermissionStatus::Granted)
    }

    async fn request_permission(&self, kind: PermissionKind) -> Result<bool, BackendError> {
        self.state().calls.push(Call::RequestPermission(kind));
        Ok(true)
    }

    async fn subscribe(
        &self,
        events: &[&'static str],
    ) -> Result<mpsc::Receiver<RawEvent>, BackendError> {
        let mut state = self.state();
        state.calls.push(Call::Subscribe(events.len()));
        if let Some(error) = state.subscribe_error.clone() {
            return Err(error);
        }
        let (tx, rx) = mpsc::channel(64);
        state.subscribers.push(tx);
        Ok(rx)
    }
}

/// Preference store with scripted persist results.
#[derive(Default)]
pub(crate) struct MockPreferenceStore {
    persisted: Mutex<Vec<ShortcutPreference>>,
    results: Mutex<VecDeque<Result<(), BackendError>>>,
}

impl MockPreferenceStore {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn script(&self, results: Vec<Result<(), BackendError>>) {
        self.results
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .extend(results);
    }

    pub(crate) fn persisted(&self) -> Vec<ShortcutPreference> {
        self.persisted
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl PreferenceStore for MockPreferenceStore {
    async fn persist(&self, preference: &ShortcutPreference) -> Result<(), BackendError> {
        let result = self
            .results
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front()
            .unwrap_or(Ok(()));
        if result.is_ok() {
            self.persisted
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .push(preference.clone());
        }
        result
    }
}

pub(crate) fn io_error() -> BackendError {
    BackendError::Io {
        reason: "disk full".to_string(),
    }
}

pub(crate) fn operation_failed(operation: &str) -> BackendError {
    BackendError::OperationFailed {
        operation: operation.to_string(),
        reason: "backend unavailable".to_string(),
    }
}
