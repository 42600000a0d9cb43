//! Win detection logic for tic-tac-toe.

use crate::{Board, Position};
use tracing::instrument;

/// The 8 canonical lines: 3 rows, 3 columns, 2 diagonals.
pub const LINES: [[Position; 3]; 8] = [
    // Rows
    [Position::TopLeft, Position::TopCenter, Position::TopRight],
    [
        Position::MiddleLeft,
        Position::Center,
        Position::MiddleRight,
    ],
    [
        Position::BottomLeft,
        Position::BottomCenter,
        Position::BottomRight,
    ],
    // Columns
    [
        Position::TopLeft,
        Position::MiddleLeft,
        Position::BottomLeft,
    ],
    [
        Position::TopCenter,
        Position::Center,
        Position::BottomCenter,
    ],
    [
        Position::TopRight,
        Position::MiddleRight,
        Position::BottomRight,
    ],
    // Diagonals
    [Position::TopLeft, Position::Center, Position::BottomRight],
    [Position::TopRight, Position::Center, Position::BottomLeft],
];

/// Result of evaluating the move just played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Evaluation {
    /// Whether the move completed a line for its occupant.
    pub won: bool,
}

/// Canonical lines passing through `position` (2 to 4 of them).
pub fn lines_through(position: Position) -> impl Iterator<Item = &'static [Position; 3]> {
    LINES.iter().filter(move |line| line.contains(&position))
}

/// Evaluates the board right after `occupant` filled `last`.
///
/// Only the lines through `last` are inspected, so this must be called
/// immediately after the move; a line completed earlier elsewhere on the
/// board is not reported.
#[instrument(skip(board, occupant), fields(last = last.number()))]
pub fn evaluate<C: PartialEq>(board: &Board<C>, last: Position, occupant: &C) -> Evaluation {
    let won = lines_through(last).any(|line| {
        line.iter()
            .all(|&position| board.get(position).is_some_and(|c| c == occupant))
    });
    Evaluation { won }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Mark;

    #[test]
    fn test_no_winner_after_first_move() {
        let mut board = Board::new();
        board.place(Position::Center, Mark::X).unwrap();
        assert!(!evaluate(&board, Position::Center, &Mark::X).won);
    }

    #[test]
    fn test_winner_top_row() {
        let mut board = Board::new();
        board.place(Position::TopLeft, Mark::X).unwrap();
        board.place(Position::TopCenter, Mark::X).unwrap();
        board.place(Position::TopRight, Mark::X).unwrap();
        assert!(evaluate(&board, Position::TopCenter, &Mark::X).won);
    }

    #[test]
    fn test_winner_diagonal() {
        let mut board = Board::new();
        board.place(Position::TopLeft, Mark::O).unwrap();
        board.place(Position::Center, Mark::O).unwrap();
        board.place(Position::BottomRight, Mark::O).unwrap();
        assert!(evaluate(&board, Position::BottomRight, &Mark::O).won);
    }

    #[test]
    fn test_line_of_other_occupant_is_not_a_win() {
        let mut board = Board::new();
        board.place(Position::TopLeft, Mark::O).unwrap();
        board.place(Position::TopCenter, Mark::O).unwrap();
        board.place(Position::TopRight, Mark::O).unwrap();
        assert!(!evaluate(&board, Position::TopRight, &Mark::X).won);
    }

    #[test]
    fn test_line_away_from_last_move_is_ignored() {
        let mut board = Board::new();
        board.place(Position::TopLeft, Mark::X).unwrap();
        board.place(Position::TopCenter, Mark::X).unwrap();
        board.place(Position::TopRight, Mark::X).unwrap();
        board.place(Position::BottomRight, Mark::X).unwrap();
        // 9 only sits on the right column, bottom row and main diagonal.
        assert!(!evaluate(&board, Position::BottomRight, &Mark::X).won);
    }

    #[test]
    fn test_lines_through_counts() {
        assert_eq!(lines_through(Position::Center).count(), 4);
        assert_eq!(lines_through(Position::TopLeft).count(), 3);
        assert_eq!(lines_through(Position::TopCenter).count(), 2);
    }

    fn reference_win(cells: &[Option<u8>; 9], last: usize, who: u8) -> bool {
        let (row, col) = (last / 3, last % 3);
        let at = |r: usize, c: usize| cells[r * 3 + c] == Some(who);
        let row_win = (0..3).all(|c| at(row, c));
        let col_win = (0..3).all(|r| at(r, col));
        let main_diag = row == col && (0..3).all(|i| at(i, i));
        let anti_diag = row + col == 2 && (0..3).all(|i| at(i, 2 - i));
        row_win || col_win || main_diag || anti_diag
    }

    #[test]
    fn test_evaluate_matches_reference_on_every_board() {
        for code in 0..3u32.pow(9) {
            let mut cells = [None; 9];
            let mut rest = code;
            for cell in cells.iter_mut() {
                *cell = match rest % 3 {
                    0 => None,
                    1 => Some(1u8),
                    _ => Some(2u8),
                };
                rest /= 3;
            }
            let board = Board::from_cells(cells);
            for last in 0..9 {
                let Some(who) = cells[last] else { continue };
                let position = Position::ALL[last];
                assert_eq!(
                    evaluate(&board, position, &who).won,
                    reference_win(&cells, last, who),
                    "board code {code}, last {}",
                    last + 1
                );
            }
        }
    }
}
