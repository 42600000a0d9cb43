//! Draw detection logic for tic-tac-toe.

use crate::Board;

/// Checks if the board is full (no empty cell left).
///
/// A full board after a non-winning move is a tie.
pub fn is_full<C>(board: &Board<C>) -> bool {
    board.cells().iter().all(Option::is_some)
}

#[cfg(test)]
mod tests {
    use super::super::win::evaluate;
    use super::*;
    use crate::{Mark, Position};

    #[test]
    fn test_empty_board_not_full() {
        let board: Board<Mark> = Board::new();
        assert!(!is_full(&board));
    }

    #[test]
    fn test_partial_board_not_full() {
        let mut board = Board::new();
        board.place(Position::Center, Mark::X).unwrap();
        assert!(!is_full(&board));
    }

    #[test]
    fn test_full_board() {
        let mut board = Board::new();
        for pos in Position::ALL {
            board.place(pos, Mark::X).unwrap();
        }
        assert!(is_full(&board));
    }

    #[test]
    fn test_draw_detection() {
        let mut board = Board::new();
        // X O X / O X X / O X O, last move O at 9
        let layout = [
            Mark::X,
            Mark::O,
            Mark::X,
            Mark::O,
            Mark::X,
            Mark::X,
            Mark::O,
            Mark::X,
            Mark::O,
        ];
        for (pos, mark) in Position::ALL.into_iter().zip(layout) {
            board.place(pos, mark).unwrap();
        }

        assert!(is_full(&board));
        assert!(!evaluate(&board, Position::BottomRight, &Mark::O).won);
    }
}
