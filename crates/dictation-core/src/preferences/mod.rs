//! Global shortcut preference and its update transaction.
//!
//! The backend keeps the active shortcut registered in memory while the
//! preference record lives in persistent storage. An update touches both,
//! so it runs as a two-phase transaction with a compensating step:
//!
//! 1. register the new shortcut (failure aborts, nothing changed);
//! 2. persist the new record;
//! 3. on persist failure, re-register the old shortcut.
//!
//! If step 3 fails too, registration and storage disagree and nothing
//! repairs it automatically. That outcome is reported as
//! [`ShortcutUpdate::Desynchronized`], never folded into plain failure.

use crate::{Backend, BackendError, PreferenceStore};

use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};

/// Shortcut used when the user has not chosen one.
pub const DEFAULT_SHORTCUT: &str = "CommandOrControl+Shift+Space";

/// The persisted shortcut preference record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortcutPreference {
    /// User's choice; `None` means the default.
    pub current_value: Option<String>,
    /// Default shortcut.
    pub default_value: String,
}

impl Default for ShortcutPreference {
    fn default() -> Self {
        Self {
            current_value: None,
            default_value: DEFAULT_SHORTCUT.to_string(),
        }
    }
}

impl ShortcutPreference {
    /// Build a record.
    pub fn new(current_value: Option<String>, default_value: impl Into<String>) -> Self {
        Self {
            current_value,
            default_value: default_value.into(),
        }
    }

    /// The shortcut that is in effect.
    pub fn effective(&self) -> &str {
        self.current_value.as_deref().unwrap_or(&self.default_value)
    }

    fn with_current(&self, current_value: Option<String>) -> Self {
        Self {
            current_value,
            default_value: self.default_value.clone(),
        }
    }
}

/// How loudly an outcome must be surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Confirmation.
    Info,
    /// The change did not stick, but everything is consistent.
    Warning,
    /// The change was refused.
    Error,
    /// Registration and storage disagree; manual repair needed.
    Critical,
}

/// Outcome of a shortcut update.
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub enum ShortcutUpdate {
    /// Registered and persisted.
    Applied {
        /// The new value.
        value: Option<String>,
    },
    /// Registration failed. No further calls were made.
    Rejected {
        /// Registration error.
        error: BackendError,
    },
    /// Persisting failed and the old shortcut was re-registered.
    RolledBack {
        /// The value that was attempted.
        attempted: Option<String>,
        /// Persist error.
        persist_error: BackendError,
    },
    /// Persisting failed and so did re-registering the old shortcut.
    Desynchronized {
        /// Still registered with the backend.
        registered: Option<String>,
        /// Still in persistent storage.
        persisted: Option<String>,
        /// Persist error.
        persist_error: BackendError,
        /// Compensation error.
        rollback_error: BackendError,
    },
}

impl ShortcutUpdate {
    /// Whether the new value is in effect and saved.
    pub fn is_applied(&self) -> bool {
        matches!(self, ShortcutUpdate::Applied { .. })
    }

    /// Whether registration and storage now disagree.
    pub fn is_desynchronized(&self) -> bool {
        matches!(self, ShortcutUpdate::Desynchronized { .. })
    }

    /// Severity for surfacing.
    pub fn severity(&self) -> Severity {
        match self {
            ShortcutUpdate::Applied { .. } => Severity::Info,
            ShortcutUpdate::RolledBack { .. } => Severity::Warning,
            ShortcutUpdate::Rejected { .. } => Severity::Error,
            ShortcutUpdate::Desynchronized { .. } => Severity::Critical,
        }
    }

    /// Message for the settings surface.
    pub fn user_message(&self) -> String {
        match self {
            ShortcutUpdate::Applied { value: Some(value) } => {
                format!("Shortcut changed to {value}.")
            }
            ShortcutUpdate::Applied { value: None } => {
                "Shortcut reset to the default.".to_string()
            }
            ShortcutUpdate::Rejected { error } => {
                format!("Could not set the shortcut: {}", error.user_message())
            }
            ShortcutUpdate::RolledBack { persist_error, .. } => format!(
                "Shortcut change not saved: {} The previous shortcut is still active.",
                persist_error.user_message()
            ),
            ShortcutUpdate::Desynchronized {
                registered,
                persisted,
                ..
            } => format!(
                "Shortcut settings are out of sync: {} is active but {} is saved. Set the shortcut again or restart the app.",
                describe(registered),
                describe(persisted)
            ),
        }
    }
}

impl fmt::Display for ShortcutUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.user_message())
    }
}

fn describe(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("the default shortcut")
}

/// Coordinates the backend registration and the persisted record.
pub struct PreferenceTransaction {
    backend: Arc<dyn Backend>,
    store: Arc<dyn PreferenceStore>,
}

impl PreferenceTransaction {
    /// Create a transaction runner.
    pub fn new(backend: Arc<dyn Backend>, store: Arc<dyn PreferenceStore>) -> Self {
        Self { backend, store }
    }

    /// Change the shortcut to `new_value` (`None` = default).
    ///
    /// `preference` is only updated on [`ShortcutUpdate::Applied`].
    #[instrument(skip(self, preference))]
    pub async fn update_shortcut(
        &self,
        preference: &mut ShortcutPreference,
        new_value: Option<String>,
    ) -> ShortcutUpdate {
        let old_value = preference.current_value.clone();

        if let Err(error) = self.backend.register_shortcut(new_value.as_deref()).await {
            warn!(error = %error, "Shortcut registration rejected");
            return ShortcutUpdate::Rejected { error };
        }

        let candidate = preference.with_current(new_value.clone());
        let persist_error = match self.store.persist(&candidate).await {
            Ok(()) => {
                *preference = candidate;
                info!(shortcut = preference.effective(), "Shortcut updated");
                return ShortcutUpdate::Applied { value: new_value };
            }
            Err(e) => e,
        };

        warn!(error = %persist_error, "Persisting shortcut failed, restoring previous registration");

        match self.backend.register_shortcut(old_value.as_deref()).await {
            Ok(()) => ShortcutUpdate::RolledBack {
                attempted: new_value,
                persist_error,
            },
            Err(rollback_error) => {
                error!(
                    registered = ?new_value,
                    persisted = ?old_value,
                    persist_error = %persist_error,
                    rollback_error = %rollback_error,
                    "Shortcut registration and saved preference are out of sync"
                );
                ShortcutUpdate::Desynchronized {
                    registered: new_value,
                    persisted: old_value,
                    persist_error,
                    rollback_error,
                }
            }
        }
    }

    /// Return to the default shortcut, under the same protocol.
    pub async fn reset_shortcut(&self, preference: &mut ShortcutPreference) -> ShortcutUpdate {
        self.update_shortcut(preference, None).await
    }
}
