use std::fmt::{Display, Formatter};
use std::str::FromStr;
use serde::{Serialize, Serializer};

use super::Square;
use crate::board::Board;
use crate::errors::Error;

// Avoid clashes between the core Result and the formatter Result
type FmtResult = std::fmt::Result;

/// A move in wire form `<from>-<to>-<amount>`: a guard step always carries
/// `amount == 1`, a tower move splits off `amount` pieces and travels
/// exactly `amount` squares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub amount: u8,
}

impl Move {
    pub const fn new(from: Square, to: Square, amount: u8) -> Self {
        Self { from, to, amount }
    }

    // An invalid move, just to use as placeholder and avoid Options
    pub const fn empty() -> Self {
        Self { from: Square::new(0), to: Square::new(0), amount: 0 }
    }

    pub const fn is_empty(&self) -> bool {
        self.amount == 0
    }

    /// Whether the destination currently holds an enemy piece.
    pub fn is_capture(&self, board: &Board) -> bool {
        let enemy = !board.turn_color();
        board.occupied_by(enemy).contains(self.to)
    }
}

impl Display for Move {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "{}-{}-{}", self.from, self.to, self.amount)
    }
}

impl FromStr for Move {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('-');
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(from), Some(to), Some(amount), None) => {
                let amount = amount
                    .parse::<u8>()
                    .ok()
                    .filter(|&a| a > 0)
                    .ok_or_else(|| Error::InvalidMove(format!("invalid amount '{amount}'")))?;
                Ok(Move::new(Square::from_notation(from)?, Square::from_notation(to)?, amount))
            }
            _ => Err(Error::InvalidMove(format!("invalid move '{s}'"))),
        }
    }
}

// Custom serialization, following the wire formatting
impl Serialize for Move {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}
