//! Shared tic-tac-toe match server.
//!
//! One match is open at a time. The first two connections play as X and O;
//! everyone after them waits in a FIFO spectator queue and is promoted when
//! a player leaves. The match state lives in a [`MatchStore`] and every
//! change is persisted before any client hears about it.
//!
//! Layers, bottom up:
//!
//! - [`state`]: the match record and the roles derived from it
//! - [`store`]: SQLite and in-memory persistence
//! - [`coordinator`]: the rules for joining, moving, replaying and leaving
//! - [`hub`] and [`actor`]: serialized event processing and fan-out
//! - [`server`]: the axum HTTP/WebSocket transport

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod actor;
pub mod config;
pub mod coordinator;
pub mod hub;
pub mod protocol;
pub mod server;
pub mod state;
pub mod store;

pub use actor::{MatchActor, MatchClosed, MatchHandle};
pub use config::{ConfigError, ServerConfig};
pub use coordinator::{ConnectionEvent, Coordinator, MatchPolicy, TurnPolicy};
pub use hub::{ConnectionHub, Outbox};
pub use protocol::{ClientEvent, Envelope, Recipient, ServerEvent};
pub use state::{ConnectionId, InvariantViolation, MatchState, Role, Score};
pub use store::{
    MatchStore, MemoryMatchStore, SqliteMatchStore, StoreError, StoreErrorKind, StoredMatch,
};
