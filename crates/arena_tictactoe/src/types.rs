//! Core domain types for tic-tac-toe.

use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::Position;

/// Player mark in the game.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
)]
pub enum Mark {
    /// Player X (moves first in a fresh game).
    X,
    /// Player O.
    O,
}

impl Mark {
    /// Returns the opposing mark.
    #[instrument]
    pub fn opponent(self) -> Self {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }

    /// Returns the single-letter label shown to clients.
    #[instrument]
    pub fn label(self) -> &'static str {
        match self {
            Mark::X => "X",
            Mark::O => "O",
        }
    }

    /// Parses a label produced by [`Mark::label`].
    #[instrument]
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "X" => Some(Mark::X),
            "O" => Some(Mark::O),
            _ => None,
        }
    }
}

/// Attempt to place on a cell that is already taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
#[display("Cell {} is already occupied", position.number())]
pub struct PlacementError {
    /// The occupied cell.
    pub position: Position,
}

/// 3x3 board whose cells hold an occupant of type `C`, or nothing.
///
/// Cells are never overwritten: once occupied, a cell only becomes empty
/// again when the whole board is cleared.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board<C> {
    /// Cells in row-major order, index 0 is position 1.
    cells: [Option<C>; 9],
}

impl<C> Board<C> {
    /// Creates an empty board.
    pub fn new() -> Self {
        Self {
            cells: std::array::from_fn(|_| None),
        }
    }

    /// Builds a board from raw cells in row-major order.
    #[cfg(test)]
    pub(crate) fn from_cells(cells: [Option<C>; 9]) -> Self {
        Self { cells }
    }

    /// Returns the occupant of a cell.
    pub fn get(&self, position: Position) -> Option<&C> {
        self.cells[position.index()].as_ref()
    }

    /// Places `occupant` on an empty cell.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError`] if the cell is already occupied; the board
    /// is left unchanged.
    pub fn place(&mut self, position: Position, occupant: C) -> Result<(), PlacementError> {
        let cell = &mut self.cells[position.index()];
        if cell.is_some() {
            return Err(PlacementError { position });
        }
        *cell = Some(occupant);
        Ok(())
    }

    /// Empties every cell.
    pub fn clear(&mut self) {
        self.cells = std::array::from_fn(|_| None);
    }

    /// Returns all cells.
    pub fn cells(&self) -> &[Option<C>; 9] {
        &self.cells
    }

    /// Number of occupied cells.
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Derives a new board by translating every occupant.
    ///
    /// Returning `None` from `f` renders that cell empty.
    pub fn map<D>(&self, mut f: impl FnMut(&C) -> Option<D>) -> Board<D> {
        Board {
            cells: std::array::from_fn(|i| self.cells[i].as_ref().and_then(&mut f)),
        }
    }
}

impl<C> Default for Board<C> {
    fn default() -> Self {
        Self::new()
    }
}
