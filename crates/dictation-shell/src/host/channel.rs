use crate::{
    AppCommand, AppError, AppResult,
    host::{Inbound, Outbound},
};

use dictation_core::{
    Backend, BackendCommand, BackendError, PermissionKind, PermissionStatus, RawEvent,
};

use std::{
    collections::HashMap,
    panic::Location,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use error_location::ErrorLocation;
use serde_json::{Value, json};
use tokio::{
    io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader},
    sync::{mpsc, oneshot},
    task::JoinHandle,
};
use tracing::{debug, error, info, instrument, trace, warn};

/// Default wait for a command response.
pub const COMMAND_TIMEOUT: Duration = Duration::from_secs(10);

/// Capacity of each subscriber's event queue.
const SUBSCRIBER_CAPACITY: usize = 64;

/// Capacity of the outbound line queue.
const OUTBOUND_CAPACITY: usize = 128;

type Reply = Result<Value, BackendError>;

/// Request/response correlation and event fan-out, shared with the reader task.
#[derive(Default)]
struct Routes {
    pending: Mutex<HashMap<u64, oneshot::Sender<Reply>>>,
    subscribers: Mutex<Vec<mpsc::Sender<RawEvent>>>,
}

impl Routes {
    /// Deliver one inbound message. UI messages are returned for the app.
    fn route(&self, message: Inbound) -> Option<AppCommand> {
        match message {
            Inbound::Response { id, ok, err } => {
                let reply = match err {
                    Some(payload) => Err(BackendError::from_value(payload)),
                    None => Ok(ok.unwrap_or(Value::Null)),
                };
                match self.pending().remove(&id) {
                    Some(waiter) => {
                        let _ = waiter.send(reply);
                    }
                    None => warn!(id, "Response for unknown command id"),
                }
                None
            }
            Inbound::Event { name, payload } => {
                self.fan_out(RawEvent::new(name, payload));
                None
            }
            Inbound::Ui(command) => Some(command),
        }
    }

    /// Number of live event subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers()
            .iter()
            .filter(|subscriber| !subscriber.is_closed())
            .count()
    }

    fn fan_out(&self, event: RawEvent) {
        let mut subscribers = self.subscribers();
        subscribers.retain(|subscriber| !subscriber.is_closed());

        trace!(event = %event.name, subscribers = subscribers.len(), "Fanning out event");

        for subscriber in subscribers.iter() {
            if let Err(mpsc::error::TrySendError::Full(event)) = subscriber.try_send(event.clone())
            {
                warn!(event = %event.name, "Subscriber queue full, dropping event");
            }
        }
    }

    fn subscribe(&self) -> mpsc::Receiver<RawEvent> {
        let (tx, rx) = mpsc::channel(SUBSCRIBER_CAPACITY);
        self.subscribers().push(tx);
        rx
    }

    fn register(&self, id: u64) -> oneshot::Receiver<Reply> {
        let (tx, rx) = oneshot::channel();
        self.pending().insert(id, tx);
        rx
    }

    fn forget(&self, id: u64) {
        self.pending().remove(&id);
    }

    // Dropping the senders fails every waiter and ends every event stream.
    fn close(&self) {
        self.pending().clear();
        self.subscribers().clear();
    }

    fn pending(&self) -> MutexGuard<'_, HashMap<u64, oneshot::Sender<Reply>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn subscribers(&self) -> MutexGuard<'_, Vec<mpsc::Sender<RawEvent>>> {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Background tasks driving a [`HostChannel`].
pub struct HostTasks {
    /// Reads and routes inbound lines until EOF.
    pub reader: JoinHandle<()>,
    /// Writes outbound lines until every sender is gone.
    pub writer: JoinHandle<()>,
}

/// [`Backend`] implementation speaking JSON lines with the host process.
pub struct HostChannel {
    outbound: mpsc::Sender<Outbound>,
    routes: Arc<Routes>,
    next_id: AtomicU64,
    timeout: Duration,
}

impl HostChannel {
    /// Start the reader and writer tasks over `reader`/`writer`.
    ///
    /// UI actions are forwarded to `commands` without waiting; when the app
    /// falls behind, further actions are dropped. When the host closes its end,
    /// pending calls fail, event streams end and [`AppCommand::Shutdown`]
    /// is sent. Command calls give up after `timeout`.
    pub fn start<R, W>(
        reader: R,
        writer: W,
        commands: mpsc::Sender<AppCommand>,
        timeout: Duration,
    ) -> (Arc<Self>, HostTasks)
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (outbound, outbound_rx) = mpsc::channel(OUTBOUND_CAPACITY);
        let routes = Arc::new(Routes::default());

        let tasks = HostTasks {
            reader: tokio::spawn(read_loop(reader, Arc::clone(&routes), commands)),
            writer: tokio::spawn(write_loop(writer, outbound_rx)),
        };

        let channel = Arc::new(Self {
            outbound,
            routes,
            next_id: AtomicU64::new(1),
            timeout,
        });

        (channel, tasks)
    }

    /// Queue a message for the host.
    #[track_caller]
    pub fn send(&self, message: Outbound) -> impl Future<Output = AppResult<()>> + '_ {
        let location = ErrorLocation::from(Location::caller());
        async move {
            self.outbound
                .send(message)
                .await
                .map_err(|e| AppError::ChannelSendFailed {
                    message: format!("host writer stopped: {e}"),
                    location,
                })
        }
    }

    /// Live event subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.routes.subscriber_count()
    }

    #[instrument(skip(self, args))]
    async fn call(&self, command: BackendCommand, args: Value) -> Result<Value, BackendError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let reply = self.routes.register(id);

        let message = Outbound::Command {
            id,
            name: command.as_str(),
            args,
        };
        if self.outbound.send(message).await.is_err() {
            self.routes.forget(id);
            return Err(BackendError::Io {
                reason: "host channel is closed".to_string(),
            });
        }

        match tokio::time::timeout(self.timeout, reply).await {
            Ok(Ok(result)) => {
                debug!(id, ok = result.is_ok(), "Command answered");
                result
            }
            Ok(Err(_)) => Err(BackendError::Io {
                reason: "host closed before answering".to_string(),
            }),
            Err(_) => {
                self.routes.forget(id);
                warn!(id, timeout_ms = self.timeout.as_millis(), "Command timed out");
                Err(BackendError::OperationFailed {
                    operation: command.as_str().to_string(),
                    reason: "no response from backend".to_string(),
                })
            }
        }
    }
}

#[async_trait]
impl Backend for HostChannel {
    async fn cancel_recording(&self) -> Result<(), BackendError> {
        self.call(BackendCommand::CancelRecording, json!({}))
            .await
            .map(|_| ())
    }

    async fn cancel_transcription(&self) -> Result<(), BackendError> {
        self.call(BackendCommand::CancelTranscription, json!({}))
            .await
            .map(|_| ())
    }

    async fn dismiss_overlay(&self) -> Result<(), BackendError> {
        self.call(BackendCommand::DismissOverlay, json!({}))
            .await
            .map(|_| ())
    }

    async fn register_shortcut(&self, shortcut: Option<&str>) -> Result<(), BackendError> {
        self.call(BackendCommand::RegisterShortcut, json!({ "shortcut": shortcut }))
            .await
            .map(|_| ())
    }

    async fn check_permission(
        &self,
        kind: PermissionKind,
    ) -> Result<PermissionStatus, BackendError> {
        let value = self
            .call(BackendCommand::CheckPermission, json!({ "kind": kind }))
            .await?;
        serde_json::from_value(value).map_err(|e| BackendError::Parse {
            reason: format!("permission status: {e}"),
        })
    }

    async fn request_permission(&self, kind: PermissionKind) -> Result<bool, BackendError> {
        let value = self
            .call(BackendCommand::RequestPermission, json!({ "kind": kind }))
            .await?;
        value.as_bool().ok_or_else(|| BackendError::Parse {
            reason: format!("expected a boolean, got {value}"),
        })
    }

    async fn subscribe(
        &self,
        events: &[&'static str],
    ) -> Result<mpsc::Receiver<RawEvent>, BackendError> {
        self.call(BackendCommand::Subscribe, json!({ "events": events }))
            .await?;
        Ok(self.routes.subscribe())
    }
}

async fn read_loop<R>(reader: R, routes: Arc<Routes>, commands: mpsc::Sender<AppCommand>)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                info!("Host closed the channel");
                break;
            }
            Err(e) => {
                error!(error = ?e, "Failed to read from host");
                break;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        let message = match Inbound::parse(&line) {
            Ok(message) => message,
            Err(e) => {
                warn!(error = %e, line = %line, "Ignoring malformed host message");
                continue;
            }
        };

        // The app may be awaiting a response routed by this loop.
        if let Some(command) = routes.route(message) {
            match commands.try_send(command) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(command)) => {
                    warn!(?command, "Application busy, dropping UI action");
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    debug!("Application stopped listening for commands");
                    break;
                }
            }
        }
    }

    routes.close();
    let _ = commands.send(AppCommand::Shutdown).await;
}

async fn write_loop<W>(mut writer: W, mut outbound: mpsc::Receiver<Outbound>)
where
    W: AsyncWrite + Unpin,
{
    while let Some(message) = outbound.recv().await {
        match write_message(&mut writer, &message).await {
            Ok(()) => {}
            Err(e @ AppError::Protocol { .. }) => {
                error!(error = %e, "Failed to encode host message");
            }
            Err(e) => {
                error!(error = %e, "Failed to write to host");
                break;
            }
        }
    }

    debug!("Host writer stopped");
}

async fn write_message<W>(writer: &mut W, message: &Outbound) -> AppResult<()>
where
    W: AsyncWrite + Unpin,
{
    let mut line = message.encode()?;
    line.push('\n');

    writer.write_all(line.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}
