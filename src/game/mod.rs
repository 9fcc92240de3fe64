//! Core game logic: gravity-fed grid with column spins, player seats, and the
//! engine that enforces turn order and detects wins and ties.

mod board;
mod engine;
mod player;

pub use board::{Cell, GridSnapshot, CONNECT};
pub use engine::{GameEngine, GameOutcome};
pub use player::{PlayerId, Seat};
