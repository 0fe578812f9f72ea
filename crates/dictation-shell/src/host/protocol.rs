//! JSON-lines messages exchanged with the host process.
//!
//! One JSON object per line, discriminated by `type`.

use crate::{AppCommand, AppResult};

use dictation_core::{PermissionKind, PermissionStatus, SessionSnapshot, Severity};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Messages read from the host.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Inbound {
    /// Reply to a command call. `err` wins when both are present.
    Response {
        /// Id of the command being answered.
        id: u64,
        /// Success value.
        #[serde(default)]
        ok: Option<Value>,
        /// Error payload.
        #[serde(default)]
        err: Option<Value>,
    },
    /// Pushed backend event.
    Event {
        /// Event name.
        name: String,
        /// Event payload.
        #[serde(default)]
        payload: Value,
    },
    /// User interaction in the host UI.
    Ui(AppCommand),
}

/// Messages written to the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Outbound {
    /// Command call awaiting a [`Inbound::Response`] with the same id.
    Command {
        /// Correlation id.
        id: u64,
        /// Wire name of the command.
        name: &'static str,
        /// Command arguments.
        args: Value,
    },
    /// A window's session changed.
    Session {
        /// Window label.
        window: String,
        /// New session snapshot.
        snapshot: SessionSnapshot,
    },
    /// Message to show the user.
    Notice {
        /// How prominently to show it.
        severity: Severity,
        /// Text to show.
        message: String,
    },
    /// Current status of a system permission.
    Permission {
        /// Permission queried.
        kind: PermissionKind,
        /// Reported status.
        status: PermissionStatus,
    },
}

impl Inbound {
    /// Parse one protocol line.
    #[track_caller]
    pub fn parse(line: &str) -> AppResult<Self> {
        Ok(serde_json::from_str(line)?)
    }
}

impl Outbound {
    /// Encode as one protocol line, without the trailing newline.
    #[track_caller]
    pub fn encode(&self) -> AppResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}
