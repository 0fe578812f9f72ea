use crate::{
    BackendError, DEFAULT_SHORTCUT, PreferenceTransaction, Severity, ShortcutPreference,
    ShortcutUpdate,
    tests::support::{Call, MockBackend, MockPreferenceStore, io_error},
};

use std::sync::Arc;

const OLD: &str = "Alt+Space";
const NEW: &str = "Ctrl+Shift+D";

fn setup() -> (Arc<MockBackend>, Arc<MockPreferenceStore>, PreferenceTransaction) {
    let backend = MockBackend::new();
    let store = MockPreferenceStore::new();
    let transaction = PreferenceTransaction::new(backend.clone(), store.clone());
    (backend, store, transaction)
}

fn saved_preference() -> ShortcutPreference {
    ShortcutPreference::new(Some(OLD.to_string()), DEFAULT_SHORTCUT)
}

fn conflict() -> BackendError {
    BackendError::OperationFailed {
        operation: "shortcut registration".to_string(),
        reason: "already in use".to_string(),
    }
}

fn register(value: &str) -> Call {
    Call::RegisterShortcut(Some(value.to_string()))
}

/// WHAT: A successful update registers, persists and updates the record
/// WHY: Happy path of the two-phase update
#[tokio::test]
async fn given_working_backend_when_updating_then_applied_and_persisted() {
    // Given: A preference set to the old shortcut
    let (backend, store, transaction) = setup();
    let mut preference = saved_preference();

    // When: Changing to the new shortcut
    let outcome = transaction
        .update_shortcut(&mut preference, Some(NEW.to_string()))
        .await;

    // Then: Applied and both sides agree
    assert_eq!(
        outcome,
        ShortcutUpdate::Applied {
            value: Some(NEW.to_string())
        }
    );
    assert_eq!(outcome.severity(), Severity::Info);
    assert_eq!(backend.calls(), vec![register(NEW)]);
    assert_eq!(preference.effective(), NEW);
    assert_eq!(store.persisted(), vec![preference.clone()]);
}

/// WHAT: A rejected registration stops the transaction
/// WHY: Nothing must be persisted for a shortcut that is not active
#[tokio::test]
async fn given_registration_rejected_when_updating_then_nothing_persisted() {
    let (backend, store, transaction) = setup();
    backend.script_register(vec![Err(conflict())]);
    let mut preference = saved_preference();

    let outcome = transaction
        .update_shortcut(&mut preference, Some(NEW.to_string()))
        .await;

    assert_eq!(outcome, ShortcutUpdate::Rejected { error: conflict() });
    assert_eq!(outcome.severity(), Severity::Error);
    assert_eq!(backend.calls(), vec![register(NEW)]);
    assert!(store.persisted().is_empty());
    assert_eq!(preference, saved_preference());
}

/// WHAT: A persist failure re-registers the old shortcut
/// WHY: Registration and storage must end up consistent
#[tokio::test]
async fn given_persist_failure_when_updating_then_rolled_back_to_old_shortcut() {
    // Given: Storage that fails
    let (backend, store, transaction) = setup();
    store.script(vec![Err(io_error())]);
    let mut preference = saved_preference();

    // When: Changing the shortcut
    let outcome = transaction
        .update_shortcut(&mut preference, Some(NEW.to_string()))
        .await;

    // Then: New then old were registered, and the record is unchanged
    assert_eq!(
        outcome,
        ShortcutUpdate::RolledBack {
            attempted: Some(NEW.to_string()),
            persist_error: io_error(),
        }
    );
    assert_eq!(outcome.severity(), Severity::Warning);
    assert_eq!(backend.calls(), vec![register(NEW), register(OLD)]);
    assert_eq!(preference.effective(), OLD);
    assert!(store.persisted().is_empty());
}

/// WHAT: A failed rollback is reported as desynchronized
/// WHY: That state needs manual repair and must never look like a plain failure
#[tokio::test]
async fn given_persist_and_rollback_failure_when_updating_then_desynchronized() {
    // Given: Storage fails and the old shortcut cannot be re-registered
    let (backend, store, transaction) = setup();
    store.script(vec![Err(io_error())]);
    backend.script_register(vec![Ok(()), Err(conflict())]);
    let mut preference = saved_preference();

    // When: Changing the shortcut
    let outcome = transaction
        .update_shortcut(&mut preference, Some(NEW.to_string()))
        .await;

    // Then: Critical desync, no further attempts
    assert!(outcome.is_desynchronized());
    assert!(!outcome.is_applied());
    assert_eq!(outcome.severity(), Severity::Critical);
    assert_eq!(
        outcome,
        ShortcutUpdate::Desynchronized {
            registered: Some(NEW.to_string()),
            persisted: Some(OLD.to_string()),
            persist_error: io_error(),
            rollback_error: conflict(),
        }
    );
    assert_eq!(backend.calls(), vec![register(NEW), register(OLD)]);
    assert_eq!(preference.effective(), OLD);
    assert!(outcome.user_message().contains(NEW));
    assert!(outcome.user_message().contains(OLD));
}

/// WHAT: Reset registers the default and clears the user's choice
/// WHY: Reset follows the same protocol as any update
#[tokio::test]
async fn given_custom_shortcut_when_reset_then_default_in_effect() {
    let (backend, store, transaction) = setup();
    let mut preference = saved_preference();

    let outcome = transaction.reset_shortcut(&mut preference).await;

    assert_eq!(outcome, ShortcutUpdate::Applied { value: None });
    assert_eq!(backend.calls(), vec![Call::RegisterShortcut(None)]);
    assert_eq!(preference.current_value, None);
    assert_eq!(preference.effective(), DEFAULT_SHORTCUT);
    assert_eq!(store.persisted().len(), 1);
}

/// WHAT: Rolling back from the default re-registers the default
/// WHY: `None` is a real previous value, not an absence of one
#[tokio::test]
async fn given_default_shortcut_when_persist_fails_then_default_re_registered() {
    let (backend, store, transaction) = setup();
    store.script(vec![Err(io_error())]);
    let mut preference = ShortcutPreference::default();

    let outcome = transaction
        .update_shortcut(&mut preference, Some(NEW.to_string()))
        .await;

    assert!(matches!(outcome, ShortcutUpdate::RolledBack { .. }));
    assert_eq!(
        backend.calls(),
        vec![register(NEW), Call::RegisterShortcut(None)]
    );
    assert_eq!(preference, ShortcutPreference::default());
}

/// WHAT: Each outcome has a distinct user message
/// WHY: The settings surface shows these verbatim
#[test]
fn given_outcomes_when_formatting_then_messages_distinct() {
    let outcomes = [
        ShortcutUpdate::Applied {
            value: Some(NEW.to_string()),
        },
        ShortcutUpdate::Applied { value: None },
        ShortcutUpdate::Rejected { error: conflict() },
        ShortcutUpdate::RolledBack {
            attempted: Some(NEW.to_string()),
            persist_error: io_error(),
        },
        ShortcutUpdate::Desynchronized {
            registered: Some(NEW.to_string()),
            persisted: None,
            persist_error: io_error(),
            rollback_error: conflict(),
        },
    ];

    let messages: Vec<String> = outcomes.iter().map(ToString::to_string).collect();

    for (i, a) in messages.iter().enumerate() {
        for b in &messages[i + 1..] {
            assert_ne!(a, b);
        }
    }
    assert!(messages[4].contains("the default shortcut"));
}
