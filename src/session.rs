//! One challenge between two participants: turns chat-side actions into
//! engine calls and decides when the match is over.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::SessionError;
use crate::game::{GameEngine, GridSnapshot, PlayerId, CONNECT};

pub const MIN_ROWS: usize = 4;
pub const MAX_ROWS: usize = 24;
pub const MIN_COLUMNS: usize = 5;
pub const MAX_COLUMNS: usize = 25;

/// No connection can exist before this many turns have been played.
const FIRST_WIN_TURN: usize = 2 * CONNECT - 1;

/// Grid size and rule options chosen when issuing a challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub rows: usize,
    pub columns: usize,
    pub spin_enabled: bool,
}

impl Default for GameSettings {
    fn default() -> Self {
        GameSettings {
            rows: 6,
            columns: 7,
            spin_enabled: true,
        }
    }
}

impl GameSettings {
    pub fn validate(&self) -> Result<(), SessionError> {
        if !(MIN_ROWS..=MAX_ROWS).contains(&self.rows)
            || !(MIN_COLUMNS..=MAX_COLUMNS).contains(&self.columns)
        {
            return Err(SessionError::DimensionsOutOfBounds {
                rows: self.rows,
                columns: self.columns,
                min_rows: MIN_ROWS,
                max_rows: MAX_ROWS,
                min_columns: MIN_COLUMNS,
                max_columns: MAX_COLUMNS,
            });
        }
        Ok(())
    }
}

/// A participant's move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "column", rename_all = "snake_case")]
pub enum Action {
    Place(usize),
    Spin(usize),
}

impl FromStr for Action {
    type Err = String;

    /// `3` places in column 3, `s3` spins column 3.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (spin, digits) = match s.strip_prefix(|c: char| c.eq_ignore_ascii_case(&'s')) {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let column = digits
            .parse::<usize>()
            .map_err(|e| format!("invalid action '{s}': {e}"))?;
        Ok(if spin {
            Action::Spin(column)
        } else {
            Action::Place(column)
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Status {
    InProgress { current: PlayerId },
    Won { winner: PlayerId },
    Tied,
}

impl Status {
    pub fn is_over(&self) -> bool {
        !matches!(self, Status::InProgress { .. })
    }
}

/// Result of an accepted action, ready to hand to a renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Turn {
    pub player: PlayerId,
    pub action: Action,
    pub turn: usize,
    pub status: Status,
    pub grid: GridSnapshot,
}

#[derive(Debug, Clone)]
pub struct Match {
    engine: GameEngine,
    status: Status,
}

impl Match {
    /// Start a match. The challenger moves first.
    pub fn challenge(
        challenger: PlayerId,
        opponent: PlayerId,
        settings: GameSettings,
    ) -> Result<Self, SessionError> {
        if challenger == opponent {
            return Err(SessionError::SelfChallenge);
        }
        settings.validate()?;

        let engine = GameEngine::new(
            settings.rows,
            settings.columns,
            settings.spin_enabled,
            challenger,
            opponent,
        )?;
        info!(
            %challenger,
            %opponent,
            rows = settings.rows,
            columns = settings.columns,
            spin = settings.spin_enabled,
            "match started"
        );

        Ok(Match {
            status: Status::InProgress {
                current: engine.current_turn(),
            },
            engine,
        })
    }

    pub fn engine(&self) -> &GameEngine {
        &self.engine
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_participant(&self, user: PlayerId) -> bool {
        self.engine.seat_of(user).is_some()
    }

    /// Whether `user` may spin a column right now.
    pub fn spin_available(&self, user: PlayerId) -> bool {
        !self.status.is_over()
            && self.engine.spin_enabled()
            && self.engine.can_play(user)
            && self.engine.can_spin(user)
    }

    /// Columns that still accept a chip, left to right.
    pub fn columns_open(&self) -> Vec<usize> {
        (0..self.engine.columns())
            .filter(|&col| self.engine.validate_placement(col).unwrap_or(false))
            .collect()
    }

    pub fn grid(&self) -> GridSnapshot {
        self.engine.grid_snapshot()
    }

    /// Apply `user`'s action and re-evaluate the match.
    pub fn act(&mut self, user: PlayerId, action: Action) -> Result<Turn, SessionError> {
        if !self.is_participant(user) {
            return Err(SessionError::NotAParticipant(user));
        }
        if self.status.is_over() {
            return Err(SessionError::GameOver);
        }

        let grid = match action {
            Action::Place(column) => self.engine.place(column, user)?,
            Action::Spin(column) => self.engine.spin(column, user)?,
        };
        self.status = self.evaluate();

        let turn = self.engine.turn_count();
        debug!(player = %user, ?action, turn, "action applied");
        match self.status {
            Status::Won { winner } => info!(%winner, turn, "match won"),
            Status::Tied => info!(turn, "match tied"),
            Status::InProgress { .. } => {}
        }

        Ok(Turn {
            player: user,
            action,
            turn,
            status: self.status,
            grid,
        })
    }

    fn evaluate(&self) -> Status {
        let engine = &self.engine;
        let turns = engine.turn_count();
        let tie_round = (engine.rows() * engine.columns()).div_ceil(2);

        if turns >= tie_round && engine.check_tie() {
            return Status::Tied;
        }
        if turns >= FIRST_WIN_TURN {
            if let Some(winner) = engine.validate_connect() {
                return Status::Won { winner };
            }
        }
        Status::InProgress {
            current: engine.current_turn(),
        }
    }
}
