//! Fire-and-forget messages to connected clients.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Message published to every connected client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// A new version took over; `deleted` lists the pruned generations.
    Activated { asset: String, api: String, deleted: Vec<String> },
    /// A background sync run finished.
    SyncCompleted { tag: String, timestamp: String },
}

/// Publishes messages to connected clients.
///
/// Delivery is best effort; there is no acknowledgement.
pub trait Broadcast: Send + Sync {
    fn broadcast(&self, message: ClientMessage);
}

/// In-process broadcaster backed by a tokio broadcast channel.
#[derive(Debug, Clone)]
pub struct ChannelBroadcast {
    tx: broadcast::Sender<ClientMessage>,
}

impl ChannelBroadcast {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Register a new client.
    pub fn subscribe(&self) -> broadcast::Receiver<ClientMessage> {
        self.tx.subscribe()
    }
}

impl Default for ChannelBroadcast {
    fn default() -> Self {
        Self::new(16)
    }
}

impl Broadcast for ChannelBroadcast {
    fn broadcast(&self, message: ClientMessage) {
        match self.tx.send(message) {
            Ok(receivers) => tracing::debug!(receivers, "broadcast client message"),
            Err(_) => tracing::debug!("no connected clients; message dropped"),
        }
    }
}
