use std::path::PathBuf;

use crate::game::PlayerId;

/// Errors returned by [`crate::game::GameEngine`]. None of them change state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("column {column} is out of range (grid has {columns} columns)")]
    ColumnOutOfRange { column: usize, columns: usize },

    #[error("cannot place a chip in column {column}")]
    InvalidMove { column: usize },

    #[error("it is not player {0}'s turn")]
    NotYourTurn(PlayerId),

    #[error("spinning columns is disabled for this game")]
    SpinDisabled,

    #[error("player {0} cannot spin a column on this turn")]
    SpinOnCooldown(PlayerId),
}

/// Errors from the match and registry layers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("player {0} is not part of this game")]
    NotAParticipant(PlayerId),

    #[error("the game is already over")]
    GameOver,

    #[error("a player cannot challenge themselves")]
    SelfChallenge,

    #[error("game {0} not found")]
    GameNotFound(u64),

    #[error("grid must be {min_rows}..={max_rows} rows and {min_columns}..={max_columns} columns, got {rows}x{columns}")]
    DimensionsOutOfBounds {
        rows: usize,
        columns: usize,
        min_rows: usize,
        max_rows: usize,
        min_columns: usize,
        max_columns: usize,
    },

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}
