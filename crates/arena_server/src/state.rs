//! The single authoritative match record and the roles derived from it.

use arena_tictactoe::{Board, Mark};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Opaque identifier of one client connection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(String);

impl ConnectionId {
    /// Wraps an existing identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh random identifier for a new connection.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a connection currently is in the match.
///
/// Always computed from [`MatchState`], never stored on a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Seated player holding a mark.
    Player(Mark),
    /// Waiting in the spectator queue at this 1-based position.
    Spectator(usize),
}

impl Role {
    /// Label sent with `you are`: `"X"`, `"O"` or `"Spectator {n}"`.
    pub fn label(self) -> String {
        match self {
            Role::Player(mark) => mark.label().to_string(),
            Role::Spectator(n) => format!("Spectator {}", n),
        }
    }
}

/// Win and tie counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Getters)]
pub struct Score {
    x_wins: u32,
    o_wins: u32,
    ties: u32,
}

impl Score {
    /// Creates a score from raw counters.
    pub fn new(x_wins: u32, o_wins: u32, ties: u32) -> Self {
        Self {
            x_wins,
            o_wins,
            ties,
        }
    }

    /// Credits a win to `mark`.
    pub fn record_win(&mut self, mark: Mark) {
        match mark {
            Mark::X => self.x_wins += 1,
            Mark::O => self.o_wins += 1,
        }
    }

    /// Counts one more tie.
    pub fn record_tie(&mut self) {
        self.ties += 1;
    }

    /// Zeroes both win counters. Ties are kept.
    pub fn reset_wins(&mut self) {
        self.x_wins = 0;
        self.o_wins = 0;
    }
}

/// Broken relationship between roles in a [`MatchState`].
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("Inconsistent match state: {}", reason)]
pub struct InvariantViolation {
    /// What is wrong.
    pub reason: String,
}

/// Board, seats, spectator queue, scores and turn of the one match.
#[derive(Debug, Clone, PartialEq, Eq, Default, Getters)]
pub struct MatchState {
    /// Cells hold the connection that played them.
    board: Board<ConnectionId>,
    player_x: Option<ConnectionId>,
    player_o: Option<ConnectionId>,
    /// FIFO promotion order, no duplicates.
    spectators: Vec<ConnectionId>,
    score: Score,
    /// Mark allowed to move next; `None` while no game is running.
    turn: Option<Mark>,
}

impl MatchState {
    /// Creates the start-of-process state: empty board, open seats, zero score.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reassembles a state from its persisted parts.
    pub fn from_parts(
        board: Board<ConnectionId>,
        player_x: Option<ConnectionId>,
        player_o: Option<ConnectionId>,
        spectators: Vec<ConnectionId>,
        score: Score,
        turn: Option<Mark>,
    ) -> Self {
        Self {
            board,
            player_x,
            player_o,
            spectators,
            score,
            turn,
        }
    }

    /// Connection seated as `mark`.
    pub fn player(&self, mark: Mark) -> Option<&ConnectionId> {
        match mark {
            Mark::X => self.player_x.as_ref(),
            Mark::O => self.player_o.as_ref(),
        }
    }

    /// Seats `id` as `mark`, or opens the seat with `None`.
    pub fn set_player(&mut self, mark: Mark, id: Option<ConnectionId>) {
        match mark {
            Mark::X => self.player_x = id,
            Mark::O => self.player_o = id,
        }
    }

    /// Mark held by `id`, if it is seated.
    pub fn mark_of(&self, id: &ConnectionId) -> Option<Mark> {
        if self.player_x.as_ref() == Some(id) {
            Some(Mark::X)
        } else if self.player_o.as_ref() == Some(id) {
            Some(Mark::O)
        } else {
            None
        }
    }

    /// Derives the role of `id`; `None` for unknown connections.
    #[instrument(skip(self))]
    pub fn role_of(&self, id: &ConnectionId) -> Option<Role> {
        if let Some(mark) = self.mark_of(id) {
            return Some(Role::Player(mark));
        }
        self.spectators
            .iter()
            .position(|s| s == id)
            .map(|idx| Role::Spectator(idx + 1))
    }

    /// Board as clients see it: occupants resolved to the marks of the
    /// currently seated players, anything else empty.
    pub fn display_board(&self) -> Board<Mark> {
        self.board.map(|occupant| self.mark_of(occupant))
    }

    /// Mutable access to the board.
    pub fn board_mut(&mut self) -> &mut Board<ConnectionId> {
        &mut self.board
    }

    /// Empties the board; seats and score are untouched.
    pub fn clear_board(&mut self) {
        self.board.clear();
    }

    /// Mutable access to the counters.
    pub fn score_mut(&mut self) -> &mut Score {
        &mut self.score
    }

    /// Sets whose move it is.
    pub fn set_turn(&mut self, turn: Option<Mark>) {
        self.turn = turn;
    }

    /// Appends `id` to the end of the queue and returns its 1-based position.
    ///
    /// An id already queued keeps its place.
    #[instrument(skip(self))]
    pub fn enqueue_spectator(&mut self, id: ConnectionId) -> usize {
        if let Some(idx) = self.spectators.iter().position(|s| *s == id) {
            debug!(%id, "Spectator already queued");
            return idx + 1;
        }
        self.spectators.push(id);
        self.spectators.len()
    }

    /// Removes `id` from the queue, returning the 0-based index it held.
    pub fn remove_spectator(&mut self, id: &ConnectionId) -> Option<usize> {
        let idx = self.spectators.iter().position(|s| s == id)?;
        self.spectators.remove(idx);
        Some(idx)
    }

    /// Pops the head of the queue for promotion.
    pub fn promote_next(&mut self) -> Option<ConnectionId> {
        if self.spectators.is_empty() {
            None
        } else {
            Some(self.spectators.remove(0))
        }
    }

    /// Drops every seat, queued spectator, board cell and the turn marker.
    pub fn clear_roles(&mut self) {
        self.player_x = None;
        self.player_o = None;
        self.spectators.clear();
        self.board.clear();
        self.turn = None;
    }

    /// Checks the role invariants: distinct players, neither queued, no
    /// duplicate spectators.
    ///
    /// # Errors
    ///
    /// Returns [`InvariantViolation`] describing the first broken rule.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        if let (Some(x), Some(o)) = (&self.player_x, &self.player_o)
            && x == o
        {
            return Err(InvariantViolation {
                reason: format!("{} holds both X and O", x),
            });
        }
        for (i, id) in self.spectators.iter().enumerate() {
            if self.mark_of(id).is_some() {
                return Err(InvariantViolation {
                    reason: format!("player {} is also queued as a spectator", id),
                });
            }
            if self.spectators[..i].contains(id) {
                return Err(InvariantViolation {
                    reason: format!("spectator {} is queued twice", id),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_tictactoe::Position;

    fn id(s: &str) -> ConnectionId {
        ConnectionId::new(s)
    }

    #[test]
    fn test_roles_are_derived_from_state() {
        let mut state = MatchState::new();
        state.set_player(Mark::X, Some(id("x")));
        state.set_player(Mark::O, Some(id("o")));
        state.enqueue_spectator(id("a"));
        state.enqueue_spectator(id("b"));

        assert_eq!(state.role_of(&id("x")), Some(Role::Player(Mark::X)));
        assert_eq!(state.role_of(&id("o")), Some(Role::Player(Mark::O)));
        assert_eq!(state.role_of(&id("b")), Some(Role::Spectator(2)));
        assert_eq!(state.role_of(&id("zz")), None);
        assert_eq!(Role::Spectator(2).label(), "Spectator 2");
        assert_eq!(Role::Player(Mark::O).label(), "O");
    }

    #[test]
    fn test_enqueue_keeps_existing_place() {
        let mut state = MatchState::new();
        assert_eq!(state.enqueue_spectator(id("a")), 1);
        assert_eq!(state.enqueue_spectator(id("b")), 2);
        assert_eq!(state.enqueue_spectator(id("a")), 1);
        assert_eq!(state.spectators().len(), 2);
    }

    #[test]
    fn test_promote_and_remove_preserve_order() {
        let mut state = MatchState::new();
        for s in ["a", "b", "c", "d"] {
            state.enqueue_spectator(id(s));
        }
        assert_eq!(state.remove_spectator(&id("b")), Some(1));
        assert_eq!(state.promote_next(), Some(id("a")));
        assert_eq!(state.spectators(), &vec![id("c"), id("d")]);
        assert_eq!(state.remove_spectator(&id("nope")), None);
    }

    #[test]
    fn test_display_board_resolves_seated_players_only() {
        let mut state = MatchState::new();
        state.set_player(Mark::X, Some(id("x")));
        state.set_player(Mark::O, Some(id("o")));
        state.board_mut().place(Position::TopLeft, id("x")).unwrap();
        state.board_mut().place(Position::Center, id("o")).unwrap();
        state.board_mut().place(Position::BottomRight, id("gone")).unwrap();

        let view = state.display_board();
        assert_eq!(view.get(Position::TopLeft), Some(&Mark::X));
        assert_eq!(view.get(Position::Center), Some(&Mark::O));
        assert_eq!(view.get(Position::BottomRight), None);
    }

    #[test]
    fn test_reset_wins_keeps_ties() {
        let mut score = Score::new(3, 2, 4);
        score.reset_wins();
        assert_eq!(score, Score::new(0, 0, 4));
        score.record_win(Mark::O);
        score.record_tie();
        assert_eq!(*score.o_wins(), 1);
        assert_eq!(*score.ties(), 5);
    }

    #[test]
    fn test_invariants_detect_double_roles() {
        let mut state = MatchState::new();
        state.set_player(Mark::X, Some(id("x")));
        assert!(state.check_invariants().is_ok());

        state.set_player(Mark::O, Some(id("x")));
        assert!(state.check_invariants().is_err());

        state.set_player(Mark::O, Some(id("o")));
        state.enqueue_spectator(id("o"));
        let err = state.check_invariants().unwrap_err();
        assert!(err.reason.contains("also queued"));
    }
}
