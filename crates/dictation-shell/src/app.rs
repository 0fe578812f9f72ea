use crate::{
    AppCommand, AppResult,
    host::{HostChannel, HostTasks, Outbound},
};

use dictation_core::{
    Backend, DismissDelays, PermissionKind, PreferenceTransaction, SessionSnapshot,
    SessionWindow, Severity, ShortcutPreference, WindowConfig, WindowHandle, WindowRole,
};

use std::{collections::HashMap, sync::Arc, time::Duration};

use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
};
use tracing::{error, info, instrument, warn};

/// Label of the main application window.
pub const MAIN_WINDOW: &str = "main";

/// Label of the recording overlay window.
pub const OVERLAY_WINDOW: &str = "recording-overlay";

const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

/// Main application state.
///
/// Owns one session window per UI window and routes host UI actions to
/// them. Every window runs on its own task; the app only talks to them
/// through their handles.
pub struct App {
    pub(crate) host: Arc<HostChannel>,
    pub(crate) host_tasks: HostTasks,
    pub(crate) transaction: PreferenceTransaction,
    pub(crate) preference: ShortcutPreference,
    pub(crate) delays: DismissDelays,
    pub(crate) command_rx: mpsc::Receiver<AppCommand>,
}

impl App {
    /// Run the main application loop until shutdown.
    #[instrument(skip(self))]
    pub(crate) async fn run(mut self) -> AppResult<()> {
        info!("Dictation shell starting");

        let backend: Arc<dyn Backend> = self.host.clone();

        let mut windows = HashMap::new();
        let mut tasks = Vec::new();
        for (label, role) in [
            (MAIN_WINDOW, WindowRole::Main),
            (OVERLAY_WINDOW, WindowRole::Overlay),
        ] {
            let mut config = WindowConfig::new(label, role);
            config.delays = self.delays;

            let (window, handle) = SessionWindow::open(config, Arc::clone(&backend)).await;
            tasks.push(window.spawn());
            tasks.push(forward_snapshots(
                label.to_string(),
                handle.watch(),
                Arc::clone(&self.host),
            ));
            windows.insert(label.to_string(), handle);
        }
        info!(
            windows = windows.len(),
            subscribers = self.host.subscriber_count(),
            "Windows open"
        );

        if let Err(e) = backend
            .register_shortcut(self.preference.current_value.as_deref())
            .await
        {
            warn!(error = %e, shortcut = self.preference.effective(), "Initial shortcut registration failed");
            self.notify(Severity::Warning, e.user_message()).await;
        }

        loop {
            tokio::select! {
                command = self.command_rx.recv() => match command {
                    Some(AppCommand::Shutdown) | None => {
                        info!("Shutdown requested");
                        break;
                    }
                    Some(command) => self.handle_command(command, &windows).await,
                },

                result = tokio::signal::ctrl_c() => {
                    if let Err(e) = result {
                        error!(error = ?e, "Failed to listen for ctrl-c");
                    }
                    info!("Interrupted, shutting down");
                    break;
                }
            }
        }

        for handle in windows.values() {
            if let Err(e) = handle.close().await {
                warn!(window = handle.label(), error = %e, "Window already closed");
            }
        }
        drop(windows);

        for task in tasks {
            match tokio::time::timeout(SHUTDOWN_GRACE, task).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => error!(error = ?e, "Window task panicked"),
                Err(_) => warn!("Window task did not stop within timeout"),
            }
        }

        self.host_tasks.reader.abort();
        drop(backend);
        drop(self.transaction);
        drop(self.host);

        match tokio::time::timeout(SHUTDOWN_GRACE, self.host_tasks.writer).await {
            Ok(Ok(())) => info!("Host writer stopped cleanly"),
            Ok(Err(e)) => error!(error = ?e, "Host writer task panicked"),
            Err(_) => info!(
                "Host writer did not stop within timeout, \
                     will be cleaned up on exit"
            ),
        }

        info!("Dictation shell shut down successfully");

        Ok(())
    }

    /// Handle one UI action.
    #[instrument(skip(self, windows))]
    pub(crate) async fn handle_command(
        &mut self,
        command: AppCommand,
        windows: &HashMap<String, WindowHandle>,
    ) {
        match command {
            AppCommand::Click { window } => match windows.get(&window) {
                Some(handle) => {
                    if let Err(e) = handle.click().await {
                        error!(window = %window, error = %e, "Failed to deliver click");
                    }
                }
                None => warn!(window = %window, "Click for unknown window"),
            },
            AppCommand::SetShortcut { value } => {
                let outcome = self
                    .transaction
                    .update_shortcut(&mut self.preference, value)
                    .await;
                self.notify(outcome.severity(), outcome.user_message()).await;
            }
            AppCommand::ResetShortcut => {
                let outcome = self.transaction.reset_shortcut(&mut self.preference).await;
                self.notify(outcome.severity(), outcome.user_message()).await;
            }
            AppCommand::CheckPermission { kind } => self.report_permission(kind).await,
            AppCommand::RequestPermission { kind } => {
                match self.host.request_permission(kind).await {
                    Ok(granted) => info!(?kind, granted, "Permission requested"),
                    Err(e) => {
                        warn!(?kind, error = %e, "Permission request failed");
                        self.notify(Severity::Error, e.user_message()).await;
                        return;
                    }
                }
                self.report_permission(kind).await;
            }
            AppCommand::Shutdown => {}
        }
    }

    async fn report_permission(&self, kind: PermissionKind) {
        match self.host.check_permission(kind).await {
            Ok(status) => {
                if let Err(e) = self.host.send(Outbound::Permission { kind, status }).await {
                    error!(error = %e, "Failed to report permission status");
                }
            }
            Err(e) => {
                warn!(?kind, error = %e, "Permission check failed");
                self.notify(Severity::Error, e.user_message()).await;
            }
        }
    }

    async fn notify(&self, severity: Severity, message: String) {
        if let Err(e) = self.host.send(Outbound::Notice { severity, message }).await {
            error!(error = %e, "Failed to send notice");
        }
    }
}

/// Mirror a window's snapshots to the host until the window is gone.
fn forward_snapshots(
    window: String,
    mut session: watch::Receiver<SessionSnapshot>,
    host: Arc<HostChannel>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while session.changed().await.is_ok() {
            let snapshot = session.borrow_and_update().clone();
            let message = Outbound::Session {
                window: window.clone(),
                snapshot,
            };
            if host.send(message).await.is_err() {
                break;
            }
        }
    })
}
