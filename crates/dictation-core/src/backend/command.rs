use std::fmt;

/// Command calls consumed by the control layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendCommand {
    /// `cancel-recording()`
    CancelRecording,
    /// `cancel-transcription()`
    CancelTranscription,
    /// `dismiss-overlay()`
    DismissOverlay,
    /// `register-shortcut(value)`
    RegisterShortcut,
    /// `check-permission(kind)`
    CheckPermission,
    /// `request-permission(kind)`
    RequestPermission,
    /// `subscribe(events)`
    Subscribe,
}

impl BackendCommand {
    /// Wire name of the command.
    pub fn as_str(self) -> &'static str {
        match self {
            BackendCommand::CancelRecording => "cancel-recording",
            BackendCommand::CancelTranscription => "cancel-transcription",
            BackendCommand::DismissOverlay => "dismiss-overlay",
            BackendCommand::RegisterShortcut => "register-shortcut",
            BackendCommand::CheckPermission => "check-permission",
            BackendCommand::RequestPermission => "request-permission",
            BackendCommand::Subscribe => "subscribe",
        }
    }
}

impl fmt::Display for BackendCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
