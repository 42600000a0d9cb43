//! Persisted record shape of the match.

use arena_tictactoe::{Board, Mark};
use chrono::NaiveDateTime;
use derive_getters::Getters;
use diesel::prelude::*;
use tracing::instrument;

use crate::state::{ConnectionId, MatchState, Score};
use crate::store::{StoreError, schema};

/// Primary key of the one and only match row.
pub const MATCH_ROW_ID: i32 = 1;

/// The single persisted row.
///
/// `game_map` and `spectators` are JSON arrays stored as text, mirroring
/// the `{gameMap, X, O, XWins, OWins, ties, spectators}` record clients and
/// operators know from the wire.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Insertable, Getters)]
#[diesel(table_name = schema::match_state)]
pub struct StoredMatch {
    id: i32,
    game_map: String,
    player_x: Option<String>,
    player_o: Option<String>,
    x_wins: i32,
    o_wins: i32,
    ties: i32,
    spectators: String,
    turn: Option<String>,
    updated_at: NaiveDateTime,
}

impl StoredMatch {
    /// Serializes a match state into its row.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if a counter no longer fits the column type.
    #[instrument(skip(state))]
    pub fn from_state(state: &MatchState) -> Result<Self, StoreError> {
        let counter = |value: u32, name: &str| {
            i32::try_from(value).map_err(|_| StoreError::corrupt(format!("{} overflow: {}", name, value)))
        };
        let score = state.score();
        Ok(Self {
            id: MATCH_ROW_ID,
            game_map: serde_json::to_string(state.board())?,
            player_x: state.player_x().as_ref().map(|id| id.to_string()),
            player_o: state.player_o().as_ref().map(|id| id.to_string()),
            x_wins: counter(*score.x_wins(), "x_wins")?,
            o_wins: counter(*score.o_wins(), "o_wins")?,
            ties: counter(*score.ties(), "ties")?,
            spectators: serde_json::to_string(state.spectators())?,
            turn: state.turn().map(|mark| mark.label().to_string()),
            updated_at: chrono::Utc::now().naive_utc(),
        })
    }

    /// Rebuilds the match state from this row.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the JSON columns are malformed, a counter is
    /// negative or the turn marker is not `X`/`O`.
    #[instrument(skip(self), fields(id = self.id))]
    pub fn into_state(self) -> Result<MatchState, StoreError> {
        let counter = |value: i32, name: &str| {
            u32::try_from(value).map_err(|_| StoreError::corrupt(format!("Negative {}: {}", name, value)))
        };
        let board: Board<ConnectionId> = serde_json::from_str(&self.game_map)?;
        let spectators: Vec<ConnectionId> = serde_json::from_str(&self.spectators)?;
        let turn = match self.turn.as_deref() {
            None => None,
            Some(label) => Some(
                Mark::from_label(label)
                    .ok_or_else(|| StoreError::corrupt(format!("Invalid turn marker: '{}'", label)))?,
            ),
        };
        let score = Score::new(
            counter(self.x_wins, "x_wins")?,
            counter(self.o_wins, "o_wins")?,
            counter(self.ties, "ties")?,
        );
        Ok(MatchState::from_parts(
            board,
            self.player_x.map(ConnectionId::new),
            self.player_o.map(ConnectionId::new),
            spectators,
            score,
            turn,
        ))
    }
}
