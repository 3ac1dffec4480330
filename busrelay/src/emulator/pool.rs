//! Delivery Channel Pool - fan many simulators into a few connections.
//!
//! The pool owns `size` slots. Each slot has its own queue and runs its own
//! delivery loop; a simulator is bound to one slot (picked uniformly at random)
//! when it is created and keeps it for life.
//!
//! # Slot state machine
//!
//! ```text
//!            connect ok              send failed
//! Connecting ──────────► Draining ──────────────► BackingOff
//!     ▲   │                                           │
//!     │   └──────── connect failed ──────────────────►│
//!     └────────────── after reconnect_delay ──────────┘
//! ```
//!
//! The queue outlives connections, so messages produced during an outage wait
//! in the queue (producers block once it is full) and go out in order after
//! reconnection. A message whose send failed is kept and sent first on the
//! next connection. Slots never affect each other.

use std::future::Future;
use std::sync::Arc;

use rand::Rng;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use super::config::PoolConfig;
use crate::codec::encode_position;
use crate::model::VehiclePosition;
use crate::transport::{MessageSink, TransportError};

/// Errors raised by a pool slot's connection.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// Could not establish the connection.
    #[error("Handshake with {target} failed: {reason}")]
    Handshake { target: String, reason: String },

    /// Established connection failed mid-stream.
    #[error("Connection lost: {0}")]
    Transport(#[from] TransportError),
}

/// Opens outbound connections for pool slots.
pub trait Connector: Send + Sync + 'static {
    type Sink: MessageSink + 'static;

    /// Open a new connection.
    fn connect(&self) -> impl Future<Output = Result<Self::Sink, ConnectionError>> + Send;
}

/// Queue handle for the slot a simulator was assigned to.
#[derive(Debug, Clone)]
pub struct SlotHandle {
    pub index: usize,
    pub queue: mpsc::Sender<VehiclePosition>,
}

/// Fixed set of delivery slots.
pub struct DeliveryPool {
    slots: Vec<mpsc::Sender<VehiclePosition>>,
    handles: Vec<JoinHandle<()>>,
}

impl DeliveryPool {
    /// Spawn one delivery task per slot.
    ///
    /// A `size` of zero is treated as one slot.
    pub fn start<C: Connector>(connector: C, config: &PoolConfig, cancel: CancellationToken) -> Self {
        let connector = Arc::new(connector);
        let size = config.size.max(1);
        let mut slots = Vec::with_capacity(size);
        let mut handles = Vec::with_capacity(size);

        for index in 0..size {
            let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
            let slot = DeliverySlot {
                index,
                connector: Arc::clone(&connector),
                reconnect_delay: config.reconnect_delay,
            };
            slots.push(tx);
            handles.push(tokio::spawn(slot.run(rx, cancel.clone())));
        }

        info!(slots = size, "Delivery pool started");
        Self { slots, handles }
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Pick a slot uniformly at random.
    pub fn assign<R: Rng + ?Sized>(&self, rng: &mut R) -> SlotHandle {
        let index = rng.random_range(0..self.slots.len());
        SlotHandle {
            index,
            queue: self.slots[index].clone(),
        }
    }

    /// Handle for a specific slot.
    pub fn slot(&self, index: usize) -> Option<SlotHandle> {
        self.slots.get(index).map(|queue| SlotHandle {
            index,
            queue: queue.clone(),
        })
    }

    /// Release the pool's queue handles and wait for every slot to stop.
    ///
    /// A slot stops once cancelled, or once all producers holding its queue
    /// are gone and the queue is drained.
    pub async fn join(self) {
        drop(self.slots);
        for handle in self.handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "Delivery slot task failed");
            }
        }
    }
}

enum SlotState<S> {
    Connecting,
    Draining(S),
    BackingOff,
}

enum DrainOutcome {
    /// Queue closed or cancelled; the slot is done.
    Stopped,
    /// The connection broke; reconnect.
    Failed(ConnectionError),
}

struct DeliverySlot<C> {
    index: usize,
    connector: Arc<C>,
    reconnect_delay: std::time::Duration,
}

impl<C: Connector> DeliverySlot<C> {
    async fn run(self, mut queue: mpsc::Receiver<VehiclePosition>, cancel: CancellationToken) {
        let mut state = SlotState::Connecting;
        let mut pending: Option<String> = None;
        let mut delivered: u64 = 0;

        loop {
            // Nothing left to deliver and nobody can produce more
            if !matches!(state, SlotState::Draining(_))
                && pending.is_none()
                && queue.is_closed()
                && queue.is_empty()
            {
                break;
            }

            state = match state {
                SlotState::Connecting => {
                    let connected = tokio::select! {
                        _ = cancel.cancelled() => break,
                        connected = self.connector.connect() => connected,
                    };
                    match connected {
                        Ok(sink) => {
                            debug!(slot = self.index, "Connection established");
                            SlotState::Draining(sink)
                        }
                        Err(e) => {
                            self.log_failure(&e);
                            SlotState::BackingOff
                        }
                    }
                }
                SlotState::Draining(mut sink) => {
                    match self
                        .drain(&mut sink, &mut queue, &mut pending, &mut delivered, &cancel)
                        .await
                    {
                        DrainOutcome::Stopped => break,
                        DrainOutcome::Failed(e) => {
                            self.log_failure(&e);
                            SlotState::BackingOff
                        }
                    }
                }
                SlotState::BackingOff => {
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = tokio::time::sleep(self.reconnect_delay) => SlotState::Connecting,
                    }
                }
            };
        }

        debug!(slot = self.index, delivered, "Delivery slot stopped");
    }

    async fn drain(
        &self,
        sink: &mut C::Sink,
        queue: &mut mpsc::Receiver<VehiclePosition>,
        pending: &mut Option<String>,
        delivered: &mut u64,
        cancel: &CancellationToken,
    ) -> DrainOutcome {
        loop {
            let message = match pending.take() {
                Some(message) => message,
                None => {
                    let position = tokio::select! {
                        _ = cancel.cancelled() => return DrainOutcome::Stopped,
                        position = queue.recv() => match position {
                            Some(position) => position,
                            None => return DrainOutcome::Stopped,
                        },
                    };
                    match encode_position(&position) {
                        Ok(message) => message,
                        Err(e) => {
                            warn!(slot = self.index, error = %e, "Failed to encode position");
                            continue;
                        }
                    }
                }
            };

            trace!(slot = self.index, message = %message, "Send message from channel");
            let sent = tokio::select! {
                _ = cancel.cancelled() => return DrainOutcome::Stopped,
                sent = sink.send(message.clone()) => sent,
            };
            match sent {
                Ok(()) => *delivered += 1,
                Err(e) => {
                    *pending = Some(message);
                    return DrainOutcome::Failed(e.into());
                }
            }
        }
    }

    fn log_failure(&self, error: &ConnectionError) {
        warn!(
            slot = self.index,
            error = %error,
            "Problems with connection, trying to reconnect through {} seconds",
            self.reconnect_delay.as_secs()
        );
    }
}
