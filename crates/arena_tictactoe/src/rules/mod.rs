//! Game rules for tic-tac-toe.
//!
//! Pure functions over a [`Board`]. Rules are kept apart from board storage
//! so the server can judge a board of connection identifiers the same way
//! tests judge a board of marks.

pub mod draw;
pub mod win;

pub use draw::is_full;
pub use win::{Evaluation, LINES, evaluate, lines_through};

use crate::{Board, Position};
use tracing::instrument;

/// What a move did to the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The mover completed a line.
    Won,
    /// No line was completed and no empty cell remains.
    Tie,
    /// The game goes on.
    Continue,
}

/// Judges the board right after `occupant` filled `last`.
///
/// A tie is only declared when the move did not win.
#[instrument(skip(board, occupant), fields(last = last.number()))]
pub fn judge<C: PartialEq>(board: &Board<C>, last: Position, occupant: &C) -> Outcome {
    if evaluate(board, last, occupant).won {
        Outcome::Won
    } else if is_full(board) {
        Outcome::Tie
    } else {
        Outcome::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Mark;

    fn board_of(layout: &str) -> Board<Mark> {
        let mut cells: [Option<Mark>; 9] = Default::default();
        for (i, ch) in layout.chars().filter(|c| !c.is_whitespace()).enumerate() {
            cells[i] = Mark::from_label(&ch.to_string());
        }
        Board::from_cells(cells)
    }

    #[test]
    fn test_winning_last_move_on_full_board_is_win_not_tie() {
        // X completes the 3-5-7 diagonal with the ninth move.
        let board = board_of("XOX OXO XXO");
        assert_eq!(judge(&board, Position::BottomLeft, &Mark::X), Outcome::Won);
    }

    #[test]
    fn test_full_board_without_line_is_tie() {
        let board = board_of("XOX XOO OXX");
        assert_eq!(judge(&board, Position::BottomRight, &Mark::X), Outcome::Tie);
    }

    #[test]
    fn test_partial_board_continues() {
        let board = board_of("X.. .O. ...");
        assert_eq!(judge(&board, Position::Center, &Mark::O), Outcome::Continue);
    }
}
