//! Per-window session runtime.
//!
//! Each window runs as one task that owns its [`SessionStore`] and handles
//! mailbox messages strictly one at a time: backend events, clicks, timer
//! expirations. Nothing inside a window runs concurrently with anything
//! else in that window, so the store needs no locking.

use crate::{
    Backend, BridgeAction, CoreError, CoreResult, DismissDelays, DismissTrigger, EventBridge,
    OverlayController, SessionEvent, SessionSnapshot, SessionStore, Subscription,
};

use std::{panic::Location, sync::Arc};

use error_location::ErrorLocation;
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
};
use tracing::{debug, error, info, instrument, warn};

/// Default mailbox capacity per window.
pub const DEFAULT_MAILBOX_CAPACITY: usize = 64;

/// Messages processed by a window task.
#[derive(Debug, Clone, PartialEq)]
pub enum WindowMessage {
    /// A decoded backend event.
    Event(SessionEvent),
    /// The user clicked the overlay.
    Click,
    /// An auto-dismiss timer elapsed.
    DismissTimerElapsed {
        /// Generation of the timer that elapsed.
        generation: u64,
    },
    /// Tear the window down.
    Close,
}

/// What a window does with its session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowRole {
    /// Reflects session state only.
    Main,
    /// Shows the recording overlay and owns its lifecycle.
    Overlay,
}

/// Settings for one window.
#[derive(Debug, Clone)]
pub struct WindowConfig {
    /// Window label used in logs and host messages.
    pub label: String,
    /// Window role.
    pub role: WindowRole,
    /// Auto-dismiss delays (overlay role only).
    pub delays: DismissDelays,
    /// Mailbox capacity.
    pub mailbox_capacity: usize,
}

impl WindowConfig {
    /// Config with default delays and capacity.
    pub fn new(label: impl Into<String>, role: WindowRole) -> Self {
        Self {
            label: label.into(),
            role,
            delays: DismissDelays::default(),
            mailbox_capacity: DEFAULT_MAILBOX_CAPACITY,
        }
    }
}

/// Handle for talking to a running window.
///
/// The window shuts down when [`WindowHandle::close`] is called or when
/// every handle has been dropped.
#[derive(Debug, Clone)]
pub struct WindowHandle {
    label: String,
    mailbox: mpsc::Sender<WindowMessage>,
    session: watch::Receiver<SessionSnapshot>,
}

impl WindowHandle {
    /// Window label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Deliver a click on the overlay.
    #[track_caller]
    pub fn click(&self) -> impl Future<Output = CoreResult<()>> + '_ {
        self.send(WindowMessage::Click)
    }

    /// Ask the window to tear down.
    #[track_caller]
    pub fn close(&self) -> impl Future<Output = CoreResult<()>> + '_ {
        self.send(WindowMessage::Close)
    }

    /// Subscribe to the window's session snapshots.
    pub fn watch(&self) -> watch::Receiver<SessionSnapshot> {
        self.session.clone()
    }

    #[track_caller]
    fn send(&self, message: WindowMessage) -> impl Future<Output = CoreResult<()>> + '_ {
        let location = ErrorLocation::from(Location::caller());
        async move {
            self.mailbox
                .send(message)
                .await
                .map_err(|_| CoreError::WindowClosed {
                    window: self.label.clone(),
                    location,
                })
        }
    }
}

/// One window's session state and the components that drive it.
pub struct SessionWindow {
    label: String,
    store: SessionStore,
    bridge: EventBridge,
    controller: Option<OverlayController>,
    subscription: Option<Subscription>,
    mailbox: mpsc::Receiver<WindowMessage>,
}

impl SessionWindow {
    /// Build a window and subscribe it to the backend's session events.
    ///
    /// A failed subscription is not fatal: the window runs with its initial
    /// state and simply receives no events.
    #[instrument(skip_all, fields(window = %config.label, role = ?config.role))]
    pub async fn open(config: WindowConfig, backend: Arc<dyn Backend>) -> (Self, WindowHandle) {
        let (tx, rx) = mpsc::channel(config.mailbox_capacity);
        let store = SessionStore::new();
        let bridge = EventBridge::new(config.label.clone());

        let subscription = match bridge.subscribe(backend.as_ref(), tx.downgrade()).await {
            Ok(subscription) => Some(subscription),
            Err(e) => {
                warn!(error = %e, "Event subscription failed; window continues without live updates");
                None
            }
        };

        let controller = match config.role {
            WindowRole::Overlay => Some(OverlayController::new(
                backend,
                tx.downgrade(),
                config.delays,
            )),
            WindowRole::Main => None,
        };

        let handle = WindowHandle {
            label: config.label.clone(),
            mailbox: tx,
            session: store.watch(),
        };

        info!("Window opened");

        let window = Self {
            label: config.label,
            store,
            bridge,
            controller,
            subscription,
            mailbox: rx,
        };

        (window, handle)
    }

    /// Window label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Whether live events are flowing into this window.
    pub fn is_subscribed(&self) -> bool {
        self.subscription.as_ref().is_some_and(Subscription::is_active)
    }

    /// Borrow the store.
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Run the window on its own task.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Process messages until closed, then tear down.
    #[instrument(skip(self), fields(window = %self.label))]
    pub async fn run(mut self) {
        'ticks: while let Some(first) = self.mailbox.recv().await {
            // A tick lasts until the mailbox runs dry.
            self.bridge.begin_tick();

            let mut next = Some(first);
            while let Some(message) = next.take() {
                if !self.handle(message).await {
                    break 'ticks;
                }
                next = self.mailbox.try_recv().ok();
            }
        }

        self.teardown();
    }

    /// Handle one message. Returns `false` once the window should close.
    pub async fn handle(&mut self, message: WindowMessage) -> bool {
        match message {
            WindowMessage::Event(event) => {
                let action = self.bridge.apply(&mut self.store, &event);
                if let Some(controller) = self.controller.as_mut() {
                    if action == BridgeAction::Dismiss
                        && let Err(e) = controller
                            .dismiss(&mut self.store, DismissTrigger::Cancellation)
                            .await
                    {
                        error!(window = %self.label, error = %e, "Failed to dismiss overlay");
                    }
                    controller.reconcile(&self.store);
                }
            }
            WindowMessage::Click => match self.controller.as_mut() {
                Some(controller) => {
                    if let Err(e) = controller.click(&mut self.store).await {
                        error!(window = %self.label, error = %e, "Overlay click failed");
                    }
                    controller.reconcile(&self.store);
                }
                None => debug!(window = %self.label, "Click ignored: window has no overlay"),
            },
            WindowMessage::DismissTimerElapsed { generation } => {
                if let Some(controller) = self.controller.as_mut() {
                    if let Err(e) = controller
                        .on_timer_elapsed(generation, &mut self.store)
                        .await
                    {
                        error!(window = %self.label, error = %e, "Auto-dismiss failed");
                    }
                    controller.reconcile(&self.store);
                }
            }
            WindowMessage::Close => return false,
        }

        true
    }

    fn teardown(&mut self) {
        // Release the subscription first so no event lands mid-teardown.
        self.subscription.take();
        if let Some(controller) = self.controller.as_mut() {
            controller.unmount();
        }
        self.mailbox.close();
        info!(window = %self.label, "Window closed");
    }
}
