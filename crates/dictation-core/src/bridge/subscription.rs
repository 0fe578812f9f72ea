use crate::{RawEvent, SessionEvent, WindowMessage};

use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, warn};

/// Scope of one window's event subscription.
///
/// Owns the task that decodes backend events and forwards them into the
/// window mailbox. Dropping the guard aborts that task, so no event can
/// reach a store after its window is torn down, on every exit path.
#[derive(Debug)]
pub struct Subscription {
    window: String,
    forwarder: JoinHandle<()>,
}

impl Subscription {
    pub(crate) fn start(
        window: String,
        mut events: mpsc::Receiver<RawEvent>,
        mailbox: mpsc::WeakSender<WindowMessage>,
    ) -> Self {
        let label = window.clone();
        let forwarder = tokio::spawn(async move {
            while let Some(raw) = events.recv().await {
                let event = match SessionEvent::decode(&raw) {
                    Ok(event) => event,
                    Err(e) => {
                        warn!(window = %label, event = %raw.name, error = ?e, "Dropping undecodable event");
                        continue;
                    }
                };

                // Weak so an open subscription does not keep a closed window alive.
                let Some(mailbox) = mailbox.upgrade() else {
                    break;
                };
                if mailbox.send(WindowMessage::Event(event)).await.is_err() {
                    break;
                }
            }
            debug!(window = %label, "Event forwarder stopped");
        });

        Self { window, forwarder }
    }

    /// Whether the forwarding task is still running.
    pub fn is_active(&self) -> bool {
        !self.forwarder.is_finished()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.forwarder.abort();
        debug!(window = %self.window, "Event subscription released");
    }
}
