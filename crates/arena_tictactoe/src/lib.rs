//! Tic-tac-toe board and rules for the shared arena match.
//!
//! This crate has no I/O. It knows how cells are numbered, who may occupy
//! them and when a move ends the game. Who the occupants *are* is up to the
//! caller: the board is generic over the occupant type, so the server can
//! store connection identifiers while tests use plain marks.
//!
//! # Example
//!
//! ```
//! use arena_tictactoe::{Board, Mark, Outcome, Position, rules};
//!
//! let mut board = Board::new();
//! for n in [1, 2, 3] {
//!     board.place(Position::new(n).unwrap(), Mark::X).unwrap();
//! }
//! let outcome = rules::judge(&board, Position::TopRight, &Mark::X);
//! assert_eq!(outcome, Outcome::Won);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod position;
pub mod rules;
mod types;

pub use position::Position;
pub use rules::{Evaluation, Outcome};
pub use types::{Board, Mark, PlacementError};
