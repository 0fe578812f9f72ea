use crate::config::{default_error_dismiss_ms, default_success_dismiss_ms};

use dictation_core::DismissDelays;

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Recording overlay behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayConfig {
    /// Auto-dismiss delay after a successful transcription, in milliseconds.
    #[serde(default = "default_success_dismiss_ms")]
    pub success_dismiss_ms: u64,

    /// Auto-dismiss delay after a failure, in milliseconds.
    #[serde(default = "default_error_dismiss_ms")]
    pub error_dismiss_ms: u64,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            success_dismiss_ms: default_success_dismiss_ms(),
            error_dismiss_ms: default_error_dismiss_ms(),
        }
    }
}

impl OverlayConfig {
    /// Delays for the overlay window's controller.
    pub fn delays(&self) -> DismissDelays {
        DismissDelays {
            success: Duration::from_millis(self.success_dismiss_ms),
            error: Duration::from_millis(self.error_dismiss_ms),
        }
    }
}
