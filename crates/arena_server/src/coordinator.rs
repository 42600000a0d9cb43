//! Session coordinator: seats players, applies moves, promotes spectators.
//!
//! Each operation is a single read-modify-write of the [`MatchState`]:
//! load it, compute the new state plus the events it implies, persist, and
//! only then hand the events back for delivery. If persisting fails the
//! events are discarded with the error, so clients never see a change the
//! store does not hold.

use arena_tictactoe::{Mark, Outcome, Position, rules};
use derive_new::new;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::protocol::{ClientEvent, Envelope, ServerEvent};
use crate::state::{ConnectionId, MatchState, Role, Score};
use crate::store::{MatchStore, StoreError};

/// How the coordinator treats moves from the player who does not hold the turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TurnPolicy {
    /// Only the player last told `your turn` may move.
    #[default]
    Strict,
    /// Either seated player may move onto any empty cell.
    Permissive,
}

/// Match rules chosen by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, new)]
pub struct MatchPolicy {
    /// Turn enforcement.
    pub turns: TurnPolicy,
    /// Zero both win counters whenever a player leaves.
    pub reset_scores_on_player_change: bool,
    /// Carry scores over from the stored match at startup.
    pub keep_scores_on_restart: bool,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            turns: TurnPolicy::Strict,
            reset_scores_on_player_change: true,
            keep_scores_on_restart: false,
        }
    }
}

/// Everything that can happen to a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// A client connected.
    Connected(ConnectionId),
    /// A client sent an event.
    Client(ConnectionId, ClientEvent),
    /// A client went away, cleanly or not.
    Disconnected(ConnectionId),
}

/// Owner of the match rules. Not internally synchronized: callers must
/// feed it one event at a time.
#[derive(Debug)]
pub struct Coordinator<S> {
    store: S,
    policy: MatchPolicy,
}

impl<S: MatchStore> Coordinator<S> {
    /// Initializes the match for a fresh process and returns the coordinator.
    ///
    /// Seats, queue, board and turn are always cleared since no connection
    /// survives a restart. Scores are zeroed unless
    /// [`MatchPolicy::keep_scores_on_restart`] is set. A corrupt stored
    /// record is replaced by a fresh match.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store is unreachable or the fresh
    /// record cannot be written.
    #[instrument(skip(store))]
    pub fn open(store: S, policy: MatchPolicy) -> Result<Self, StoreError> {
        let previous = match store.load() {
            Ok(previous) => previous,
            Err(e) if e.is_corrupt() => {
                warn!(error = %e, "Stored match is corrupt, starting fresh");
                None
            }
            Err(e) => return Err(e),
        };
        let had_previous = previous.is_some();
        let mut state = previous.unwrap_or_default();
        state.clear_roles();

        if policy.keep_scores_on_restart {
            info!(score = ?state.score(), "Keeping scores from previous run");
        } else {
            *state.score_mut() = Score::default();
        }

        store.save(&state)?;
        info!(had_previous, turns = %policy.turns, "Match initialized");
        Ok(Self { store, policy })
    }

    /// Reads the current match state.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store cannot be read.
    pub fn snapshot(&self) -> Result<MatchState, StoreError> {
        self.load()
    }

    /// Dispatches one connection event.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the state could not be loaded or persisted;
    /// no events are produced in that case.
    pub fn handle(&mut self, event: ConnectionEvent) -> Result<Vec<Envelope>, StoreError> {
        match event {
            ConnectionEvent::Connected(id) => self.connect(id),
            ConnectionEvent::Client(id, ClientEvent::Move(position)) => self.play(&id, position),
            ConnectionEvent::Client(id, ClientEvent::PlayAgain) => self.play_again(&id),
            ConnectionEvent::Disconnected(id) => self.disconnect(&id),
        }
    }

    /// Assigns a role to a new connection: X, then O, then the spectator queue.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store fails.
    #[instrument(skip(self, id), fields(connection = %id))]
    pub fn connect(&mut self, id: ConnectionId) -> Result<Vec<Envelope>, StoreError> {
        let mut state = self.load()?;

        if let Some(role) = state.role_of(&id) {
            warn!(role = %role.label(), "Connection already has a role");
            return Ok(Vec::new());
        }

        let mut out = Vec::new();
        if state.player_x().is_none() {
            state.set_player(Mark::X, Some(id.clone()));
            match state.player_o().clone() {
                Some(o) => {
                    state.set_turn(Some(Mark::O));
                    out.push(Envelope::to(&o, ServerEvent::YourTurn));
                }
                None => state.set_turn(None),
            }
            out.push(Envelope::to(&id, ServerEvent::YouAre(Mark::X.label().into())));
            info!("Seated as X");
        } else if state.player_o().is_none() {
            state.set_player(Mark::O, Some(id.clone()));
            state.set_turn(Some(Mark::X));
            out.push(Envelope::to(&id, ServerEvent::NotYourTurn));
            out.push(Envelope::to(&id, ServerEvent::YouAre(Mark::O.label().into())));
            if let Some(x) = state.player_x() {
                out.push(Envelope::to(x, ServerEvent::YourTurn));
            }
            info!("Seated as O");
        } else {
            let n = state.enqueue_spectator(id.clone());
            out.push(Envelope::to(&id, ServerEvent::GameMap(state.display_board())));
            out.push(Envelope::to(&id, ServerEvent::YouAre(Role::Spectator(n).label())));
            info!(queue_position = n, "Queued as spectator");
        }

        self.commit(&state, out)
    }

    /// Applies a move by `id` on the cell numbered `position`.
    ///
    /// Moves are dropped without any event when the number is out of range,
    /// the sender is not seated, the cell is taken, or (under
    /// [`TurnPolicy::Strict`]) the sender does not hold the turn.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store fails.
    #[instrument(skip(self, id), fields(connection = %id))]
    pub fn play(&mut self, id: &ConnectionId, position: i64) -> Result<Vec<Envelope>, StoreError> {
        let Some(position) = Position::from_wire(position) else {
            debug!("Move outside the board ignored");
            return Ok(Vec::new());
        };

        let mut state = self.load()?;

        let Some(mark) = state.mark_of(id) else {
            debug!("Move from a non-player ignored");
            return Ok(Vec::new());
        };

        if self.policy.turns == TurnPolicy::Strict && *state.turn() != Some(mark) {
            debug!(%mark, turn = ?state.turn(), "Out-of-turn move ignored");
            return Ok(Vec::new());
        }

        if let Err(e) = state.board_mut().place(position, id.clone()) {
            debug!(error = %e, "Move on occupied cell ignored");
            return Ok(Vec::new());
        }

        let mut out = vec![Envelope::everyone(ServerEvent::OpponentMoved {
            position,
            player: mark,
        })];

        match rules::judge(state.board(), position, id) {
            Outcome::Won => {
                state.score_mut().record_win(mark);
                state.clear_board();
                state.set_turn(None);
                let score = *state.score();
                info!(winner = %mark, score = ?score, "Game won");
                out.push(Envelope::everyone(ServerEvent::SomebodyWon(
                    mark,
                    *score.x_wins(),
                    *score.o_wins(),
                    *score.ties(),
                )));
            }
            Outcome::Tie => {
                state.score_mut().record_tie();
                state.clear_board();
                state.set_turn(None);
                let ties = *state.score().ties();
                info!(ties, "Game tied");
                out.push(Envelope::everyone(ServerEvent::Tie(ties)));
            }
            Outcome::Continue => {
                let next = mark.opponent();
                state.set_turn(Some(next));
                out.push(Envelope::to(id, ServerEvent::NotYourTurn));
                if let Some(other) = state.player(next) {
                    out.push(Envelope::to(other, ServerEvent::YourTurn));
                }
                debug!(%mark, position = position.number(), "Move applied");
            }
        }

        self.commit(&state, out)
    }

    /// Clears the board and tells everyone a new game starts.
    ///
    /// Seats and scores are untouched. X moves first when both seats are
    /// filled. Requests from unknown connections are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store fails.
    #[instrument(skip(self, id), fields(connection = %id))]
    pub fn play_again(&mut self, id: &ConnectionId) -> Result<Vec<Envelope>, StoreError> {
        let mut state = self.load()?;

        if state.role_of(id).is_none() {
            debug!("Replay request from unknown connection ignored");
            return Ok(Vec::new());
        }

        state.clear_board();
        let both_seated = state.player_x().is_some() && state.player_o().is_some();
        state.set_turn(both_seated.then_some(Mark::X));
        info!("New game requested");

        self.commit(&state, vec![Envelope::everyone(ServerEvent::NewGame)])
    }

    /// Removes a connection, promoting the head of the spectator queue into a
    /// vacated seat and relabeling everyone behind it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store fails.
    #[instrument(skip(self, id), fields(connection = %id))]
    pub fn disconnect(&mut self, id: &ConnectionId) -> Result<Vec<Envelope>, StoreError> {
        let mut state = self.load()?;
        let mut out = Vec::new();

        if let Some(mark) = state.mark_of(id) {
            state.clear_board();
            let other = state.player(mark.opponent()).cloned();
            if let Some(other) = &other {
                out.push(Envelope::to(other, ServerEvent::Quitter));
            }

            match state.promote_next() {
                Some(next) => {
                    state.set_player(mark, Some(next.clone()));
                    state.set_turn(Some(mark));
                    out.push(Envelope::to(&next, ServerEvent::YouAre(mark.label().into())));
                    out.push(Envelope::to(&next, ServerEvent::YourTurn));
                    if let Some(other) = &other {
                        out.push(Envelope::to(other, ServerEvent::NewGame));
                    }
                    out.extend(relabel_spectators(&state, 0));
                    info!(%mark, promoted = %next, remaining = state.spectators().len(), "Spectator promoted");
                }
                None => {
                    state.set_player(mark, None);
                    state.set_turn(None);
                    info!(%mark, "Player left, seat open");
                }
            }

            if self.policy.reset_scores_on_player_change {
                state.score_mut().reset_wins();
            }
        } else if let Some(idx) = state.remove_spectator(id) {
            out.extend(relabel_spectators(&state, idx));
            info!(former_position = idx + 1, "Spectator left");
        } else {
            debug!("Unknown connection left");
            return Ok(Vec::new());
        }

        self.commit(&state, out)
    }

    fn load(&self) -> Result<MatchState, StoreError> {
        match self.store.load()? {
            Some(state) => Ok(state),
            None => {
                warn!("Match record missing, starting from a fresh state");
                Ok(MatchState::new())
            }
        }
    }

    /// Persists `state`, releasing `out` only once the write succeeded.
    fn commit(&self, state: &MatchState, out: Vec<Envelope>) -> Result<Vec<Envelope>, StoreError> {
        if let Err(violation) = state.check_invariants() {
            warn!(%violation, "Persisting inconsistent match state");
        }
        self.store.save(state)?;
        Ok(out)
    }
}

/// `you are Spectator {n}` for every queued spectator from index `from` on.
fn relabel_spectators(state: &MatchState, from: usize) -> impl Iterator<Item = Envelope> + '_ {
    state
        .spectators()
        .iter()
        .enumerate()
        .skip(from)
        .map(|(i, s)| Envelope::to(s, ServerEvent::YouAre(Role::Spectator(i + 1).label())))
}
