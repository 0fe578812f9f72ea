use serde::{Deserialize, Serialize};

/// System permissions the backend can query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PermissionKind {
    /// Microphone capture.
    Microphone,
    /// Accessibility API, needed to insert text at the cursor.
    Accessibility,
}

/// Permission state as reported by the operating system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PermissionStatus {
    /// Access granted.
    Granted,
    /// Access explicitly refused.
    Denied,
    /// The user has not been asked yet.
    NotDetermined,
    /// Blocked by policy; the user cannot change it.
    Restricted,
}
