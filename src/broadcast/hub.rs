//! Broadcast Hub
//!
//! Listeners register to get a receiver on a shared tokio broadcast channel.
//! Each envelope remembers which listener, if any, it came from so that
//! relayed events skip their sender.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::debug;

use super::{BroadcastError, BroadcastEvent, Broadcaster};

// == Envelope ==
pub type ClientId = u64;

/// An event plus the listener that emitted it (`None` for server events).
#[derive(Debug, Clone)]
pub struct Envelope {
    pub origin: Option<ClientId>,
    pub event: BroadcastEvent,
}

impl Envelope {
    /// Whether this envelope should be delivered to `client`.
    pub fn is_for(&self, client: ClientId) -> bool {
        self.origin != Some(client)
    }
}

// == Broadcast Hub ==
#[derive(Debug)]
pub struct BroadcastHub {
    sender: broadcast::Sender<Envelope>,
    next_client: AtomicU64,
}

impl BroadcastHub {
    // == Constructor ==
    /// Create a hub buffering up to `capacity` events per listener
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            next_client: AtomicU64::new(1),
        }
    }

    // == Register ==
    /// Attaches a new listener.
    pub fn register(&self) -> (ClientId, broadcast::Receiver<Envelope>) {
        let id = self.next_client.fetch_add(1, Ordering::Relaxed);
        (id, self.sender.subscribe())
    }

    // == Publish ==
    /// Sends a server event to every listener. Returns how many received it.
    pub fn publish(&self, event: BroadcastEvent) -> usize {
        self.send(Envelope {
            origin: None,
            event,
        })
    }

    // == Relay ==
    /// Rebroadcasts a listener's event to every other listener.
    pub fn relay(&self, origin: ClientId, event: BroadcastEvent) -> usize {
        self.send(Envelope {
            origin: Some(origin),
            event,
        })
    }

    pub fn listener_count(&self) -> usize {
        self.sender.receiver_count()
    }

    fn send(&self, envelope: Envelope) -> usize {
        // No listeners is not an error for fire-and-forget delivery
        match self.sender.send(envelope) {
            Ok(receivers) => receivers,
            Err(broadcast::error::SendError(envelope)) => {
                debug!("No listeners for {} event", envelope.event.event);
                0
            }
        }
    }
}

impl Default for BroadcastHub {
    fn default() -> Self {
        Self::new(256)
    }
}

// == Broadcaster Implementation ==
#[async_trait]
impl Broadcaster for BroadcastHub {
    async fn broadcast(&self, event: &str, payload: Value) -> Result<(), BroadcastError> {
        let delivered = self.publish(BroadcastEvent::new(event, payload));
        debug!("Broadcast {} to {} listeners", event, delivered);
        Ok(())
    }
}
