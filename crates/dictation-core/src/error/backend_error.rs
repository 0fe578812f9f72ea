//! Error payloads reported by the transcription backend.
//!
//! The backend serializes its errors in the externally tagged form
//! (`"MicAccessDenied"`, `{"ModelNotFound": {"path": ".."}}`), while
//! values produced on this side round-trip through an internally tagged
//! form (`{"kind": "io", "reason": ".."}`). Decoding accepts both and
//! never fails: anything unrecognised becomes [`BackendError::Unknown`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Structured error payload carried by failed command calls and failure events.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum BackendError {
    /// The user has not granted access to a protected resource.
    #[error("Access to the {resource} was denied")]
    PermissionDenied {
        /// Resource that was refused (e.g. `microphone`).
        resource: String,
    },

    /// A file or resource the backend needs does not exist.
    #[error("Not found: {path}")]
    NotFound {
        /// Path or identifier of the missing resource.
        path: String,
    },

    /// A backend operation failed.
    #[error("{operation} failed: {reason}")]
    OperationFailed {
        /// Operation that failed (e.g. `transcription`).
        operation: String,
        /// Human-readable reason for failure.
        reason: String,
    },

    /// Persisted preferences could not be read.
    #[error("Failed to load preferences: {reason}")]
    Load {
        /// Human-readable reason for failure.
        reason: String,
    },

    /// Persisted preferences could not be decoded.
    #[error("Failed to parse preferences: {reason}")]
    Parse {
        /// Human-readable reason for failure.
        reason: String,
    },

    /// Preferences could not be written.
    #[error("Preference storage IO error: {reason}")]
    Io {
        /// Human-readable reason for failure.
        reason: String,
    },

    /// Payload in a shape this layer does not recognise.
    #[error("Unrecognized backend error: {raw}")]
    Unknown {
        /// The payload exactly as received.
        raw: Value,
    },
}

impl BackendError {
    /// Decode an error payload. Total: unknown shapes become `Unknown`.
    pub fn from_value(value: Value) -> Self {
        let decoded = match &value {
            Value::String(tag) => Self::from_tag(tag, None).or_else(|| {
                // Plain string errors are free-form failure messages.
                Some(Self::OperationFailed {
                    operation: "backend".to_string(),
                    reason: tag.clone(),
                })
            }),
            Value::Object(map) => match map.get("kind") {
                Some(_) => serde_json::from_value(value.clone()).ok(),
                None if map.len() == 1 => map
                    .iter()
                    .next()
                    .and_then(|(tag, fields)| Self::from_tag(tag, Some(fields))),
                _ => None,
            },
            _ => None,
        };

        decoded.unwrap_or(Self::Unknown { raw: value })
    }

    /// Placeholder used when the backend reports an error state without a payload.
    pub fn unreported() -> Self {
        Self::OperationFailed {
            operation: "session".to_string(),
            reason: "the backend reported an error without details".to_string(),
        }
    }

    /// Message suitable for display in the overlay or a toast.
    pub fn user_message(&self) -> String {
        match self {
            BackendError::PermissionDenied { resource } => format!(
                "Access to the {resource} was denied. Grant permission in System Settings and try again."
            ),
            BackendError::NotFound { path } => format!("Required file not found: {path}"),
            BackendError::OperationFailed { operation, reason } => {
                format!("{} failed: {reason}", capitalize(operation))
            }
            BackendError::Load { .. } => "Your preferences could not be loaded.".to_string(),
            BackendError::Parse { .. } => {
                "Your preferences file is damaged and could not be read.".to_string()
            }
            BackendError::Io { .. } => "Your preferences could not be saved to disk.".to_string(),
            BackendError::Unknown { .. } => "Something went wrong. Please try again.".to_string(),
        }
    }

    // Externally tagged names as emitted by the backend.
    fn from_tag(tag: &str, fields: Option<&Value>) -> Option<Self> {
        let field = |name: &str| -> String {
            match fields {
                Some(Value::Object(map)) => string_field(map, name),
                Some(Value::String(s)) => s.clone(),
                _ => String::new(),
            }
        };
        let failed = |operation: &str| Self::OperationFailed {
            operation: operation.to_string(),
            reason: field("reason"),
        };

        let error = match tag {
            "MicAccessDenied" => Self::PermissionDenied {
                resource: "microphone".to_string(),
            },
            "AccessibilityDenied" => Self::PermissionDenied {
                resource: "accessibility API".to_string(),
            },
            "PermissionDenied" => Self::PermissionDenied {
                resource: field("resource"),
            },
            "ModelNotFound" | "NotFound" => Self::NotFound {
                path: field("path"),
            },
            "ModelLoadFailed" => failed("model load"),
            "TranscriptionFailed" => failed("transcription"),
            "RecordingFailed" => failed("recording"),
            "ClipboardFailed" => failed("clipboard"),
            "Load" => Self::Load {
                reason: field("reason"),
            },
            "Parse" => Self::Parse {
                reason: field("reason"),
            },
            "Io" => Self::Io {
                reason: field("reason"),
            },
            _ => return None,
        };
        Some(error)
    }
}

fn string_field(map: &Map<String, Value>, name: &str) -> String {
    match map.get(name) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
