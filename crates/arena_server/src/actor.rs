//! Serialized processing of connection events.
//!
//! Transports never touch the coordinator directly. They send commands to a
//! single actor that owns the [`Coordinator`] and the [`ConnectionHub`] and
//! handles one command at a time, so no two read-modify-write cycles on the
//! match can interleave.

use derive_more::{Display, Error};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument};

use crate::coordinator::{ConnectionEvent, Coordinator};
use crate::hub::{ConnectionHub, Outbox};
use crate::protocol::ClientEvent;
use crate::state::ConnectionId;
use crate::store::{MatchStore, StoreError};

/// Capacity of the actor's command queue.
const COMMAND_QUEUE: usize = 1024;

/// The match actor has stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
#[display("Match actor is no longer running")]
pub struct MatchClosed;

/// Work items for the actor.
#[derive(Debug)]
pub enum Command {
    /// Register `outbox` for `id` and assign it a role.
    Connect {
        /// New connection.
        id: ConnectionId,
        /// Where its events go.
        outbox: Outbox,
    },
    /// A client event from `id`.
    Client {
        /// Sender.
        id: ConnectionId,
        /// What it sent.
        event: ClientEvent,
    },
    /// `id` is gone.
    Disconnect {
        /// Departed connection.
        id: ConnectionId,
    },
}

/// Cloneable handle for submitting commands.
#[derive(Debug, Clone)]
pub struct MatchHandle {
    tx: mpsc::Sender<Command>,
}

impl MatchHandle {
    /// Announces a new connection.
    ///
    /// # Errors
    ///
    /// Returns [`MatchClosed`] if the actor has stopped.
    pub async fn connect(&self, id: ConnectionId, outbox: Outbox) -> Result<(), MatchClosed> {
        self.submit(Command::Connect { id, outbox }).await
    }

    /// Forwards a client event.
    ///
    /// # Errors
    ///
    /// Returns [`MatchClosed`] if the actor has stopped.
    pub async fn client_event(&self, id: ConnectionId, event: ClientEvent) -> Result<(), MatchClosed> {
        self.submit(Command::Client { id, event }).await
    }

    /// Announces that a connection ended.
    ///
    /// # Errors
    ///
    /// Returns [`MatchClosed`] if the actor has stopped.
    pub async fn disconnect(&self, id: ConnectionId) -> Result<(), MatchClosed> {
        self.submit(Command::Disconnect { id }).await
    }

    async fn submit(&self, command: Command) -> Result<(), MatchClosed> {
        self.tx.send(command).await.map_err(|_| MatchClosed)
    }
}

/// Owner of the coordinator and the hub.
#[derive(Debug)]
pub struct MatchActor<S> {
    coordinator: Coordinator<S>,
    hub: ConnectionHub,
    rx: mpsc::Receiver<Command>,
}

impl<S: MatchStore + 'static> MatchActor<S> {
    /// Starts the actor on the blocking pool, since store calls are
    /// synchronous. It stops once every [`MatchHandle`] is dropped.
    #[instrument(skip(coordinator))]
    pub fn spawn(coordinator: Coordinator<S>) -> (MatchHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(COMMAND_QUEUE);
        let actor = Self {
            coordinator,
            hub: ConnectionHub::new(),
            rx,
        };
        let task = tokio::task::spawn_blocking(move || actor.run());
        info!("Match actor started");
        (MatchHandle { tx }, task)
    }

    fn run(mut self) {
        while let Some(command) = self.rx.blocking_recv() {
            self.process(command);
        }
        info!(connections = self.hub.len(), "Match actor stopped");
    }

    fn process(&mut self, command: Command) {
        let event = match command {
            Command::Connect { id, outbox } => {
                self.hub.add(id.clone(), outbox);
                ConnectionEvent::Connected(id)
            }
            Command::Client { id, event } => ConnectionEvent::Client(id, event),
            Command::Disconnect { id } => {
                if !self.hub.remove(&id) {
                    debug!(connection = %id, "Disconnect for unregistered connection");
                }
                ConnectionEvent::Disconnected(id)
            }
        };

        match self.coordinator.handle(event.clone()) {
            Ok(envelopes) => {
                self.hub.deliver(envelopes);
            }
            Err(e) => self.report_failure(event, &e),
        }
    }

    /// Logs a store failure and undoes hub registration for a connection
    /// that never got a role.
    fn report_failure(&mut self, event: ConnectionEvent, e: &StoreError) {
        match event {
            ConnectionEvent::Connected(id) => {
                // Dropping the outbox ends the writer task and closes the socket.
                self.hub.remove(&id);
                error!(error = %e, kind = %e.kind, connection = %id, "Role not persisted, connection closed");
            }
            ConnectionEvent::Disconnected(id) => {
                let held = self
                    .coordinator
                    .snapshot()
                    .ok()
                    .and_then(|state| state.role_of(&id));
                match held {
                    Some(role) => error!(
                        error = %e,
                        kind = %e.kind,
                        connection = %id,
                        stuck = %role.label(),
                        "Departure not persisted, role still held by a closed connection"
                    ),
                    None => error!(error = %e, kind = %e.kind, connection = %id, "Departure not persisted"),
                }
            }
            ConnectionEvent::Client(id, event) => {
                error!(error = %e, kind = %e.kind, connection = %id, ?event, "Match update not persisted, nothing broadcast");
            }
        }
    }
}
