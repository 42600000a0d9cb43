//! Event messages exchanged with clients.
//!
//! Every frame is a JSON object `{"event": <name>, "data": <payload>}`; the
//! `data` member is absent for events without payload.

use arena_tictactoe::{Board, Mark, Position};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::state::ConnectionId;

/// Events the server sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    /// Role assignment: `"X"`, `"O"` or `"Spectator {n}"`.
    #[serde(rename = "you are")]
    YouAre(String),
    /// The receiver may move now.
    #[serde(rename = "your turn")]
    YourTurn,
    /// The receiver must wait.
    #[serde(rename = "not your turn")]
    NotYourTurn,
    /// A move landed on the board.
    #[serde(rename = "opponent moved")]
    OpponentMoved {
        /// Cell that was filled.
        position: Position,
        /// Mark that filled it.
        player: Mark,
    },
    /// Game won: `[player, scoreX, scoreO, ties]`.
    #[serde(rename = "somebody won")]
    SomebodyWon(Mark, u32, u32, u32),
    /// Game tied; carries the updated tie count.
    #[serde(rename = "tie")]
    Tie(u32),
    /// Full board snapshot for a late joiner.
    #[serde(rename = "gameMap")]
    GameMap(Board<Mark>),
    /// Board cleared, a fresh game begins.
    #[serde(rename = "new game")]
    NewGame,
    /// The opponent left.
    #[serde(rename = "quitter")]
    Quitter,
}

impl ServerEvent {
    /// Event name as it appears on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::YouAre(_) => "you are",
            ServerEvent::YourTurn => "your turn",
            ServerEvent::NotYourTurn => "not your turn",
            ServerEvent::OpponentMoved { .. } => "opponent moved",
            ServerEvent::SomebodyWon(..) => "somebody won",
            ServerEvent::Tie(_) => "tie",
            ServerEvent::GameMap(_) => "gameMap",
            ServerEvent::NewGame => "new game",
            ServerEvent::Quitter => "quitter",
        }
    }

    /// Serializes to a text frame.
    ///
    /// # Errors
    ///
    /// Returns the serializer error; cannot happen for well-formed events.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Events clients send.
///
/// `move` carries the raw integer; range checking happens in the
/// coordinator so that out-of-range numbers are dropped the same way as
/// moves on occupied cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    /// Play the given cell.
    #[serde(rename = "move")]
    Move(i64),
    /// Clear the board and start over.
    #[serde(rename = "play again")]
    PlayAgain,
}

impl ClientEvent {
    /// Parses a text frame.
    ///
    /// # Errors
    ///
    /// Fails for unknown events and wrongly typed payloads.
    #[instrument(skip(text), fields(len = text.len()))]
    pub fn decode(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// Who an outgoing event is for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipient {
    /// A single connection.
    Connection(ConnectionId),
    /// Every connected client, players and spectators alike.
    Everyone,
}

/// An event addressed to its recipients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Destination.
    pub recipient: Recipient,
    /// Payload.
    pub event: ServerEvent,
}

impl Envelope {
    /// Addresses `event` to one connection.
    pub fn to(id: &ConnectionId, event: ServerEvent) -> Self {
        Self {
            recipient: Recipient::Connection(id.clone()),
            event,
        }
    }

    /// Addresses `event` to everyone.
    pub fn everyone(event: ServerEvent) -> Self {
        Self {
            recipient: Recipient::Everyone,
            event,
        }
    }
}
