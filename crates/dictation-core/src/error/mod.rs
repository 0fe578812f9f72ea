mod backend_error;

pub use backend_error::BackendError;

use error_location::ErrorLocation;
use thiserror::Error;

/// Control-layer errors with source location tracking.
#[derive(Error, Debug)]
pub enum CoreError {
    /// The backend refused or could not open the event stream.
    #[error("Event subscription failed for window {window}: {source} {location}")]
    SubscriptionFailed {
        /// Label of the window that tried to subscribe.
        window: String,
        /// Error payload returned by the backend.
        #[source]
        source: BackendError,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A command call returned an error payload.
    #[error("Command {command} failed: {source} {location}")]
    CommandFailed {
        /// Wire name of the command.
        command: &'static str,
        /// Error payload returned by the backend.
        #[source]
        source: BackendError,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// An event arrived with a payload that does not match its name.
    #[error("Malformed payload for event {event}: {source} {location}")]
    EventDecode {
        /// Name of the offending event.
        event: String,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// An event name outside the session event set.
    #[error("Unknown event {event} {location}")]
    UnknownEvent {
        /// Name of the offending event.
        event: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The window task is gone and can no longer accept messages.
    #[error("Window {window} is closed {location}")]
    WindowClosed {
        /// Label of the closed window.
        window: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

/// Result type alias using [`CoreError`].
pub type Result<T> = std::result::Result<T, CoreError>;
