//! # Spin Four
//!
//! A Connect Four engine for chat bots, on grids from 4×5 up to 24×25, with an
//! optional column-spin move that flips a column upside down.
//!
//! ## Modules
//!
//! - [`game`] — Core game logic: grid, seats, engine with win/tie detection
//! - [`session`] — Match adapter: participants, gating, match status
//! - [`registry`] — Many concurrent matches, one lock per game
//! - [`config`] — TOML configuration loading and validation
//! - [`logging`] — `tracing` subscriber setup
//! - [`error`] — Structured error types

pub mod config;
pub mod error;
pub mod game;
pub mod logging;
pub mod registry;
pub mod session;
