//! Event fan-out to connected clients.

use std::collections::HashMap;

use tokio::sync::mpsc;
use tracing::{debug, instrument, warn};

use crate::protocol::{Envelope, Recipient, ServerEvent};
use crate::state::ConnectionId;

/// Sending half of a connection's outgoing event queue.
pub type Outbox = mpsc::UnboundedSender<ServerEvent>;

/// Outgoing queues of every live connection.
///
/// Delivery never blocks: each connection has an unbounded queue drained by
/// its own writer task, and a queue whose writer is gone is skipped.
#[derive(Debug, Default)]
pub struct ConnectionHub {
    connections: HashMap<ConnectionId, Outbox>,
}

impl ConnectionHub {
    /// Creates an empty hub.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a connection's outbox.
    #[instrument(skip(self, outbox))]
    pub fn add(&mut self, id: ConnectionId, outbox: Outbox) {
        if self.connections.insert(id, outbox).is_some() {
            warn!("Connection re-registered, previous outbox replaced");
        }
    }

    /// Forgets a connection. Returns whether it was registered.
    #[instrument(skip(self))]
    pub fn remove(&mut self, id: &ConnectionId) -> bool {
        self.connections.remove(id).is_some()
    }

    /// Number of registered connections.
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// Whether no connection is registered.
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Sends every envelope in order and returns how many single-connection
    /// sends succeeded.
    ///
    /// A failed send is logged and does not affect other recipients.
    #[instrument(skip_all, fields(envelopes = envelopes.len()))]
    pub fn deliver(&self, envelopes: Vec<Envelope>) -> usize {
        let mut delivered = 0;
        for Envelope { recipient, event } in envelopes {
            match recipient {
                Recipient::Connection(id) => {
                    if self.send(&id, event) {
                        delivered += 1;
                    }
                }
                Recipient::Everyone => {
                    for id in self.connections.keys() {
                        if self.send(id, event.clone()) {
                            delivered += 1;
                        }
                    }
                }
            }
        }
        debug!(delivered, "Events delivered");
        delivered
    }

    fn send(&self, id: &ConnectionId, event: ServerEvent) -> bool {
        let Some(outbox) = self.connections.get(id) else {
            debug!(connection = %id, event = event.name(), "No outbox for recipient");
            return false;
        };
        match outbox.send(event) {
            Ok(()) => true,
            Err(mpsc::error::SendError(event)) => {
                warn!(connection = %id, event = event.name(), "Outbox closed, event dropped");
                false
            }
        }
    }
}
