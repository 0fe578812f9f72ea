use std::{panic::Location, path::PathBuf, result::Result as StdResult};

use error_location::ErrorLocation;
use thiserror::Error;

/// Application-level errors for the dictation shell.
///
/// All variants include `ErrorLocation` for call-site tracking.
#[derive(Error, Debug)]
pub enum AppError {
    /// The platform config directory could not be determined.
    #[error("No configuration directory available {location}")]
    ConfigDirUnavailable {
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// The config file exists but could not be read.
    #[error("Failed to read config {path:?}: {source} {location}")]
    ConfigRead {
        /// Config file path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// The config file is not valid TOML for [`crate::config::Config`].
    #[error("Failed to parse config {path:?}: {source} {location}")]
    ConfigParse {
        /// Config file path.
        path: PathBuf,
        /// The underlying TOML error.
        #[source]
        source: toml::de::Error,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Serializing or writing the config file failed.
    #[error("Failed to save config: {reason} {location}")]
    ConfigWrite {
        /// Human-readable reason for failure.
        reason: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// A host message could not be encoded or decoded.
    #[error("Host protocol error: {source} {location}")]
    Protocol {
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Failed to send message through async channel.
    #[error("Channel send failed: {message} {location}")]
    ChannelSendFailed {
        /// Human-readable error message.
        message: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// IO error from filesystem or stdio operations.
    #[error("IO error: {source} {location}")]
    IoError {
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
        /// Location where this error was created.
        location: ErrorLocation,
    },
}

// Manual From impls with location tracking.
// Cannot use #[from] because it does not support extra fields.
impl From<serde_json::Error> for AppError {
    #[track_caller]
    fn from(source: serde_json::Error) -> Self {
        AppError::Protocol {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<std::io::Error> for AppError {
    #[track_caller]
    fn from(source: std::io::Error) -> Self {
        AppError::IoError {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

/// Convenience type alias for Results using `AppError`.
pub type Result<T> = StdResult<T, AppError>;
