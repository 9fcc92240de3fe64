use serde::{Deserialize, Serialize};

use super::board::Cell;

/// Opaque, stable identifier of a participant (e.g. a chat user id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which side of the board a player sits on. `A` always moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Seat {
    A,
    B,
}

impl Seat {
    /// Get the other seat
    pub fn other(self) -> Seat {
        match self {
            Seat::A => Seat::B,
            Seat::B => Seat::A,
        }
    }

    /// Convert seat to the token it drops
    pub fn to_cell(self) -> Cell {
        match self {
            Seat::A => Cell::PlayerA,
            Seat::B => Cell::PlayerB,
        }
    }

    /// Seat owning a token, `None` for an empty cell
    pub fn from_cell(cell: Cell) -> Option<Seat> {
        match cell {
            Cell::Empty => None,
            Cell::PlayerA => Some(Seat::A),
            Cell::PlayerB => Some(Seat::B),
        }
    }
}
