//! Real-time fan-out of processed documents.
//!
//! The subscriber set is owned by a single [`Fanout`] task. Every
//! mutation and every broadcast is a message on its command channel, so
//! callers on any task or thread (the HTTP ingest handler, the bus
//! bridge, WebSocket connections) never touch the set directly.
//!
//! Delivery is non-blocking: each subscriber has a bounded buffer, and a
//! subscriber whose buffer is full or closed is dropped from the set
//! without affecting delivery to the others. There is no replay; a
//! subscriber only sees broadcasts issued after it connected.

use std::collections::BTreeMap;
use std::sync::Arc;

use telemetry_types::{SubscriberId, TelemetryDocument};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// Per-subscriber buffer size.
pub const SUBSCRIBER_BUFFER: usize = 64;

/// Errors from the fan-out handle.
#[derive(Debug, thiserror::Error)]
pub enum FanoutError {
    /// The fan-out task has stopped.
    #[error("fan-out task is not running")]
    Closed,

    /// The document could not be serialized for delivery.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A pre-serialized document shared by every recipient.
pub type Frame = Arc<str>;

#[derive(Debug)]
enum Command {
    Connect {
        id: SubscriberId,
        tx: mpsc::Sender<Frame>,
    },
    Disconnect(SubscriberId),
    Broadcast(Frame),
    Count(oneshot::Sender<usize>),
}

/// Receiving half handed to a newly connected subscriber.
#[derive(Debug)]
pub struct Subscription {
    /// Key used to disconnect.
    pub id: SubscriberId,
    /// Frames addressed to this subscriber.
    pub rx: mpsc::Receiver<Frame>,
}

/// Cloneable, thread-safe handle to the fan-out task.
#[derive(Debug, Clone)]
pub struct FanoutHandle {
    commands: mpsc::UnboundedSender<Command>,
}

impl FanoutHandle {
    /// Register a new subscriber.
    ///
    /// # Errors
    ///
    /// Returns [`FanoutError::Closed`] if the fan-out task has stopped.
    pub fn connect(&self) -> Result<Subscription, FanoutError> {
        let id = SubscriberId::new();
        let (tx, rx) = mpsc::channel(SUBSCRIBER_BUFFER);
        self.send(Command::Connect { id, tx })?;
        Ok(Subscription { id, rx })
    }

    /// Remove a subscriber. Unknown keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`FanoutError::Closed`] if the fan-out task has stopped.
    pub fn disconnect(&self, id: SubscriberId) -> Result<(), FanoutError> {
        self.send(Command::Disconnect(id))
    }

    /// Queue `document` for delivery to every current subscriber.
    ///
    /// The document is serialized once here; the fan-out task only
    /// clones the shared frame. Returns as soon as the command is queued.
    ///
    /// # Errors
    ///
    /// Returns [`FanoutError::Serialization`] if the document cannot be
    /// encoded, or [`FanoutError::Closed`] if the task has stopped.
    pub fn broadcast(&self, document: &TelemetryDocument) -> Result<(), FanoutError> {
        let frame: Frame = serde_json::to_string(document)?.into();
        self.send(Command::Broadcast(frame))
    }

    /// Number of subscribers currently registered.
    ///
    /// Observes every command queued before the call.
    ///
    /// # Errors
    ///
    /// Returns [`FanoutError::Closed`] if the fan-out task has stopped.
    pub async fn subscriber_count(&self) -> Result<usize, FanoutError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Count(tx))?;
        rx.await.map_err(|_| FanoutError::Closed)
    }

    fn send(&self, command: Command) -> Result<(), FanoutError> {
        self.commands.send(command).map_err(|_| FanoutError::Closed)
    }
}

/// The task that owns the subscriber set.
#[derive(Debug)]
pub struct Fanout {
    commands: mpsc::UnboundedReceiver<Command>,
    subscribers: BTreeMap<SubscriberId, mpsc::Sender<Frame>>,
}

impl Fanout {
    /// Create the task state and its handle.
    pub fn channel() -> (Self, FanoutHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                commands: rx,
                subscribers: BTreeMap::new(),
            },
            FanoutHandle { commands: tx },
        )
    }

    /// Process commands until every handle has been dropped.
    pub async fn run(mut self) {
        while let Some(command) = self.commands.recv().await {
            match command {
                Command::Connect { id, tx } => {
                    self.subscribers.insert(id, tx);
                    tracing::info!(
                        subscriber = %id,
                        subscribers = self.subscribers.len(),
                        "subscriber connected"
                    );
                }
                Command::Disconnect(id) => {
                    if self.subscribers.remove(&id).is_some() {
                        tracing::info!(
                            subscriber = %id,
                            subscribers = self.subscribers.len(),
                            "subscriber disconnected"
                        );
                    }
                }
                Command::Broadcast(frame) => self.deliver(&frame),
                Command::Count(reply) => {
                    let _ = reply.send(self.subscribers.len());
                }
            }
        }
        tracing::debug!("fan-out task stopped");
    }

    fn deliver(&mut self, frame: &Frame) {
        self.subscribers.retain(|id, tx| match tx.try_send(Arc::clone(frame)) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(subscriber = %id, error = %e, "dropping subscriber");
                false
            }
        });
    }
}

/// Spawn the fan-out task on the current runtime.
pub fn spawn_fanout() -> (FanoutHandle, JoinHandle<()>) {
    let (fanout, handle) = Fanout::channel();
    let task = tokio::spawn(fanout.run());
    (handle, task)
}
