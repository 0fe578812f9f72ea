//! Session events pushed by the backend.
//!
//! Events arrive as [`RawEvent`] (a name plus a JSON payload) and are
//! decoded into [`SessionEvent`] before they reach a window. Delivery is
//! best effort and unacknowledged; payload fields other than the ones a
//! mutation needs are optional.

use crate::{BackendError, CoreError, CoreResult};

use std::panic::Location;

use error_location::ErrorLocation;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

/// `recording-started{timestamp}`
pub const RECORDING_STARTED: &str = "recording-started";
/// `recording-stopped{duration_ms, sample_count}`
pub const RECORDING_STOPPED: &str = "recording-stopped";
/// `recording-failed{error}`
pub const RECORDING_FAILED: &str = "recording-failed";
/// `recording-overlay-shown{}`
pub const RECORDING_OVERLAY_SHOWN: &str = "recording-overlay-shown";
/// `recording-overlay-dismissed{}`
pub const RECORDING_OVERLAY_DISMISSED: &str = "recording-overlay-dismissed";
/// `recording-cancelled{}`
pub const RECORDING_CANCELLED: &str = "recording-cancelled";
/// `recording-state-changed{state}`
pub const RECORDING_STATE_CHANGED: &str = "recording-state-changed";
/// `transcription-started{timestamp}`
pub const TRANSCRIPTION_STARTED: &str = "transcription-started";
/// `transcription-complete{text, duration_ms}`
pub const TRANSCRIPTION_COMPLETE: &str = "transcription-complete";
/// `transcription-failed{error}`
pub const TRANSCRIPTION_FAILED: &str = "transcription-failed";
/// `transcription-cancelled{timestamp}`
pub const TRANSCRIPTION_CANCELLED: &str = "transcription-cancelled";

/// Every event a session window subscribes to.
pub const SESSION_EVENTS: [&str; 11] = [
    RECORDING_STARTED,
    RECORDING_STOPPED,
    RECORDING_FAILED,
    RECORDING_OVERLAY_SHOWN,
    RECORDING_OVERLAY_DISMISSED,
    RECORDING_CANCELLED,
    RECORDING_STATE_CHANGED,
    TRANSCRIPTION_STARTED,
    TRANSCRIPTION_COMPLETE,
    TRANSCRIPTION_FAILED,
    TRANSCRIPTION_CANCELLED,
];

/// An event exactly as delivered by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    /// Event name, e.g. `recording-started`.
    pub name: String,
    /// Event payload; `null` for payload-less events.
    #[serde(default)]
    pub payload: Value,
}

impl RawEvent {
    /// Build a raw event.
    pub fn new(name: impl Into<String>, payload: Value) -> Self {
        Self {
            name: name.into(),
            payload,
        }
    }
}

/// Decoded session event.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Audio capture began.
    RecordingStarted {
        /// Unix time in milliseconds.
        timestamp: u64,
    },
    /// Audio capture ended; transcription follows.
    RecordingStopped {
        /// Length of the captured audio.
        duration_ms: u64,
        /// Number of captured samples.
        sample_count: u64,
    },
    /// Audio capture could not start or broke off.
    RecordingFailed {
        /// Structured failure.
        error: BackendError,
    },
    /// Inference began.
    TranscriptionStarted {
        /// Unix time in milliseconds.
        timestamp: u64,
    },
    /// Inference produced text.
    TranscriptionComplete {
        /// Transcribed text.
        text: String,
        /// Inference time.
        duration_ms: u64,
    },
    /// Inference failed.
    TranscriptionFailed {
        /// Structured failure.
        error: BackendError,
    },
    /// Inference was aborted on request.
    TranscriptionCancelled {
        /// Unix time in milliseconds.
        timestamp: u64,
    },
    /// The overlay window was shown.
    OverlayShown,
    /// The overlay window was hidden.
    OverlayDismissed,
    /// The recording was cancelled and its audio discarded.
    RecordingCancelled,
    /// Catch-all state report. `state` is not case-normalised yet.
    StateChanged {
        /// State label as sent.
        state: String,
    },
}

#[derive(Deserialize)]
struct TimestampPayload {
    #[serde(default)]
    timestamp: u64,
}

#[derive(Deserialize)]
struct RecordingStoppedPayload {
    #[serde(default)]
    duration_ms: u64,
    #[serde(default)]
    sample_count: u64,
}

#[derive(Deserialize)]
struct FailurePayload {
    #[serde(default)]
    error: Value,
}

#[derive(Deserialize)]
struct TranscriptionCompletePayload {
    text: String,
    #[serde(default)]
    duration_ms: u64,
}

#[derive(Deserialize)]
struct StateChangedPayload {
    state: String,
}

impl SessionEvent {
    /// Decode a raw event into its typed form.
    #[track_caller]
    pub fn decode(raw: &RawEvent) -> CoreResult<Self> {
        let event = match raw.name.as_str() {
            RECORDING_STARTED => {
                let p: TimestampPayload = payload(raw)?;
                SessionEvent::RecordingStarted {
                    timestamp: p.timestamp,
                }
            }
            RECORDING_STOPPED => {
                let p: RecordingStoppedPayload = payload(raw)?;
                SessionEvent::RecordingStopped {
                    duration_ms: p.duration_ms,
                    sample_count: p.sample_count,
                }
            }
            RECORDING_FAILED => {
                let p: FailurePayload = payload(raw)?;
                SessionEvent::RecordingFailed {
                    error: BackendError::from_value(p.error),
                }
            }
            TRANSCRIPTION_STARTED => {
                let p: TimestampPayload = payload(raw)?;
                SessionEvent::TranscriptionStarted {
                    timestamp: p.timestamp,
                }
            }
            TRANSCRIPTION_COMPLETE => {
                let p: TranscriptionCompletePayload = payload(raw)?;
                SessionEvent::TranscriptionComplete {
                    text: p.text,
                    duration_ms: p.duration_ms,
                }
            }
            TRANSCRIPTION_FAILED => {
                let p: FailurePayload = payload(raw)?;
                SessionEvent::TranscriptionFailed {
                    error: BackendError::from_value(p.error),
                }
            }
            TRANSCRIPTION_CANCELLED => {
                let p: TimestampPayload = payload(raw)?;
                SessionEvent::TranscriptionCancelled {
                    timestamp: p.timestamp,
                }
            }
            RECORDING_OVERLAY_SHOWN => SessionEvent::OverlayShown,
            RECORDING_OVERLAY_DISMISSED => SessionEvent::OverlayDismissed,
            RECORDING_CANCELLED => SessionEvent::RecordingCancelled,
            RECORDING_STATE_CHANGED => {
                let p: StateChangedPayload = payload(raw)?;
                SessionEvent::StateChanged { state: p.state }
            }
            other => {
                return Err(CoreError::UnknownEvent {
                    event: other.to_string(),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        };

        Ok(event)
    }

    /// Wire name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::RecordingStarted { .. } => RECORDING_STARTED,
            SessionEvent::RecordingStopped { .. } => RECORDING_STOPPED,
            SessionEvent::RecordingFailed { .. } => RECORDING_FAILED,
            SessionEvent::TranscriptionStarted { .. } => TRANSCRIPTION_STARTED,
            SessionEvent::TranscriptionComplete { .. } => TRANSCRIPTION_COMPLETE,
            SessionEvent::TranscriptionFailed { .. } => TRANSCRIPTION_FAILED,
            SessionEvent::TranscriptionCancelled { .. } => TRANSCRIPTION_CANCELLED,
            SessionEvent::OverlayShown => RECORDING_OVERLAY_SHOWN,
            SessionEvent::OverlayDismissed => RECORDING_OVERLAY_DISMISSED,
            SessionEvent::RecordingCancelled => RECORDING_CANCELLED,
            SessionEvent::StateChanged { .. } => RECORDING_STATE_CHANGED,
        }
    }
}

// `()` payloads arrive as null; treat them as an empty object so
// all-default payload structs still decode.
#[track_caller]
fn payload<T: DeserializeOwned>(raw: &RawEvent) -> CoreResult<T> {
    let value = match &raw.payload {
        Value::Null => Value::Object(Map::new()),
        other => other.clone(),
    };

    serde_json::from_value(value).map_err(|source| CoreError::EventDecode {
        event: raw.name.clone(),
        source,
        location: ErrorLocation::from(Location::caller()),
    })
}
