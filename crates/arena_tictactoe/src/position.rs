//! Board positions numbered 1 through 9.

use serde::{Deserialize, Serialize};
use tracing::instrument;

/// A cell on the board.
///
/// Cells are numbered the way clients see them:
///
/// ```text
/// 1 2 3
/// 4 5 6
/// 7 8 9
/// ```
///
/// On the wire a position is its number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Position {
    /// Top-left (1)
    TopLeft,
    /// Top-center (2)
    TopCenter,
    /// Top-right (3)
    TopRight,
    /// Middle-left (4)
    MiddleLeft,
    /// Center (5)
    Center,
    /// Middle-right (6)
    MiddleRight,
    /// Bottom-left (7)
    BottomLeft,
    /// Bottom-center (8)
    BottomCenter,
    /// Bottom-right (9)
    BottomRight,
}

impl Position {
    /// All 9 positions in numeric order.
    pub const ALL: [Position; 9] = [
        Position::TopLeft,
        Position::TopCenter,
        Position::TopRight,
        Position::MiddleLeft,
        Position::Center,
        Position::MiddleRight,
        Position::BottomLeft,
        Position::BottomCenter,
        Position::BottomRight,
    ];

    /// Creates a position from its 1-based number.
    #[instrument]
    pub fn new(number: u8) -> Option<Self> {
        match number {
            1..=9 => Some(Self::ALL[usize::from(number) - 1]),
            _ => None,
        }
    }

    /// Validates an integer received from a client.
    ///
    /// Anything outside `1..=9` is rejected.
    #[instrument]
    pub fn from_wire(value: i64) -> Option<Self> {
        u8::try_from(value).ok().and_then(Self::new)
    }

    /// The 1-based number clients use.
    pub fn number(self) -> u8 {
        self as u8 + 1
    }

    /// The 0-based board index.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl From<Position> for u8 {
    fn from(position: Position) -> Self {
        position.number()
    }
}

impl TryFrom<u8> for Position {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("Position {} out of range (must be 1-9)", value))
    }
}
