use crate::{RecordingState, WindowMessage};

use std::time::Duration;

use tokio::{sync::mpsc, task::JoinHandle};

/// Pending auto-dismiss timer.
///
/// Posts [`WindowMessage::DismissTimerElapsed`] into the window mailbox
/// when it elapses. Dropping the guard aborts the timer task, so a timer
/// can never outlive the controller that armed it.
#[derive(Debug)]
pub(crate) struct DismissTimer {
    handle: JoinHandle<()>,
    pub(crate) generation: u64,
    pub(crate) armed_for: RecordingState,
    pub(crate) delay: Duration,
}

impl DismissTimer {
    pub(crate) fn arm(
        delay: Duration,
        generation: u64,
        armed_for: RecordingState,
        mailbox: mpsc::WeakSender<WindowMessage>,
    ) -> Self {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(mailbox) = mailbox.upgrade() {
                let _ = mailbox
                    .send(WindowMessage::DismissTimerElapsed { generation })
                    .await;
            }
        });

        Self {
            handle,
            generation,
            armed_for,
            delay,
        }
    }
}

impl Drop for DismissTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
