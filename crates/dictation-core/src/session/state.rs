use std::fmt;

use serde::{Deserialize, Serialize};

/// Recording session states. Drives all overlay rendering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingState {
    /// No session in progress.
    #[default]
    Idle,
    /// Capturing audio.
    Recording,
    /// Audio captured, inference running.
    Transcribing,
    /// Transcription result available.
    Done,
    /// Recording or transcription failed.
    Error,
}

impl RecordingState {
    /// Parse a state label case-insensitively (`"Recording"`, `"recording"`).
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "idle" => Some(RecordingState::Idle),
            "recording" => Some(RecordingState::Recording),
            "transcribing" => Some(RecordingState::Transcribing),
            "done" => Some(RecordingState::Done),
            "error" => Some(RecordingState::Error),
            _ => None,
        }
    }

    /// Lowercase label.
    pub fn as_str(self) -> &'static str {
        match self {
            RecordingState::Idle => "idle",
            RecordingState::Recording => "recording",
            RecordingState::Transcribing => "transcribing",
            RecordingState::Done => "done",
            RecordingState::Error => "error",
        }
    }
}

impl fmt::Display for RecordingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
