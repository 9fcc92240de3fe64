use serde::Serialize;

use super::board::{self, Board, Cell, GridSnapshot};
use super::player::{PlayerId, Seat};
use crate::error::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameOutcome {
    Winner(PlayerId),
    Tie,
}

/// What the most recent successful mutation was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LastAction {
    Placed,
    Spun { by: Seat },
}

/// Grid, turn order and spin bookkeeping for one game.
///
/// The engine only knows player ids and column indices. Queries take `&self`
/// and mutations take `&mut self`, so a host sharing an engine across threads
/// has to serialize mutations itself (see [`crate::registry::GameRegistry`]).
/// Every failing operation leaves the engine untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameEngine {
    board: Board,
    spin_enabled: bool,
    players: [PlayerId; 2],
    current: Seat,
    turn_count: usize,
    last_move: Option<(usize, usize)>,
    last_spin_turn: usize,
    last_spin_player: Option<PlayerId>,
    last_action: Option<LastAction>,
}

impl GameEngine {
    /// Create a fresh game. `player_a` moves first.
    pub fn new(
        rows: usize,
        columns: usize,
        spin_enabled: bool,
        player_a: PlayerId,
        player_b: PlayerId,
    ) -> Result<Self, EngineError> {
        if rows < 1 || columns < 1 {
            return Err(EngineError::InvalidConfiguration(format!(
                "grid must have at least one row and one column, got {rows}x{columns}"
            )));
        }
        if player_a == player_b {
            return Err(EngineError::InvalidConfiguration(format!(
                "both seats are taken by player {player_a}"
            )));
        }

        Ok(GameEngine {
            board: Board::new(rows, columns),
            spin_enabled,
            players: [player_a, player_b],
            current: Seat::A,
            turn_count: 0,
            last_move: None,
            last_spin_turn: 0,
            last_spin_player: None,
            last_action: None,
        })
    }

    pub fn rows(&self) -> usize {
        self.board.rows()
    }

    pub fn columns(&self) -> usize {
        self.board.cols()
    }

    pub fn spin_enabled(&self) -> bool {
        self.spin_enabled
    }

    /// Players in turn order
    pub fn players(&self) -> (PlayerId, PlayerId) {
        (self.players[0], self.players[1])
    }

    pub fn player(&self, seat: Seat) -> PlayerId {
        match seat {
            Seat::A => self.players[0],
            Seat::B => self.players[1],
        }
    }

    /// Seat of a participant, `None` for anyone else
    pub fn seat_of(&self, player: PlayerId) -> Option<Seat> {
        if player == self.players[0] {
            Some(Seat::A)
        } else if player == self.players[1] {
            Some(Seat::B)
        } else {
            None
        }
    }

    pub fn current_turn(&self) -> PlayerId {
        self.player(self.current)
    }

    pub fn turn_count(&self) -> usize {
        self.turn_count
    }

    /// Cell the last win check is anchored on, as (row, column)
    pub fn last_move(&self) -> Option<(usize, usize)> {
        self.last_move
    }

    pub fn can_play(&self, player: PlayerId) -> bool {
        player == self.current_turn()
    }

    fn check_column(&self, column: usize) -> Result<(), EngineError> {
        if column >= self.columns() {
            return Err(EngineError::ColumnOutOfRange {
                column,
                columns: self.columns(),
            });
        }
        Ok(())
    }

    fn check_turn(&self, player: PlayerId) -> Result<(), EngineError> {
        if !self.can_play(player) {
            return Err(EngineError::NotYourTurn(player));
        }
        Ok(())
    }

    /// Whether a chip can still be dropped into `column`
    pub fn validate_placement(&self, column: usize) -> Result<bool, EngineError> {
        self.check_column(column)?;
        Ok(!self.board.is_column_full(column))
    }

    fn move_error(&self, column: usize, err: board::MoveError) -> EngineError {
        match err {
            board::MoveError::ColumnFull => EngineError::InvalidMove { column },
            board::MoveError::InvalidColumn => EngineError::ColumnOutOfRange {
                column,
                columns: self.columns(),
            },
        }
    }

    /// Row a chip dropped into `column` would settle on
    pub fn placement_row(&self, column: usize) -> Result<usize, EngineError> {
        self.board
            .landing_row(column)
            .map_err(|e| self.move_error(column, e))
    }

    /// Drop `player`'s chip into `column` and hand the turn over.
    pub fn place(
        &mut self,
        column: usize,
        player: PlayerId,
    ) -> Result<GridSnapshot, EngineError> {
        self.check_turn(player)?;

        let row = match self.board.drop_piece(column, self.current.to_cell()) {
            Ok(row) => row,
            Err(e) => return Err(self.move_error(column, e)),
        };
        self.last_move = Some((row, column));
        self.last_action = Some(LastAction::Placed);
        self.end_turn();

        Ok(self.board.snapshot())
    }

    /// At least two turns since the last spin, and `player` did not make it.
    pub fn can_spin(&self, player: PlayerId) -> bool {
        self.turn_count.saturating_sub(self.last_spin_turn) >= 2
            && self.last_spin_player != Some(player)
    }

    /// Flip `column` top-to-bottom as the current player's turn.
    pub fn spin(
        &mut self,
        column: usize,
        player: PlayerId,
    ) -> Result<GridSnapshot, EngineError> {
        if !self.spin_enabled {
            return Err(EngineError::SpinDisabled);
        }
        self.check_turn(player)?;
        self.check_column(column)?;
        if !self.can_spin(player) {
            return Err(EngineError::SpinOnCooldown(player));
        }

        if let Err(e) = self.board.spin_column(column) {
            return Err(self.move_error(column, e));
        }

        // Anchor the win check on the spinner's topmost chip in the column.
        let mover = self.current.to_cell();
        self.last_move = (0..self.rows())
            .find(|&row| self.board.get(row, column) == mover)
            .map(|row| (row, column));
        self.last_action = Some(LastAction::Spun { by: self.current });
        self.end_turn();
        self.last_spin_turn = self.turn_count;
        self.last_spin_player = Some(player);

        Ok(self.board.snapshot())
    }

    fn end_turn(&mut self) {
        self.turn_count += 1;
        self.current = self.current.other();
    }

    /// Winner through the most recent move, if any.
    ///
    /// Placements are checked by scanning the four axes through `last_move`.
    /// A spin can line up chips away from the spun column, so after a spin
    /// the whole grid is scanned as well, the spinner taking precedence.
    pub fn validate_connect(&self) -> Option<PlayerId> {
        let anchored = self
            .last_move
            .and_then(|(row, col)| self.board.connection_at(row, col))
            .and_then(Seat::from_cell)
            .map(|seat| self.player(seat));

        match (anchored, self.last_action) {
            (Some(winner), _) => Some(winner),
            (None, Some(LastAction::Spun { by })) => [by, by.other()]
                .into_iter()
                .find(|seat| self.board.has_connection(seat.to_cell()))
                .map(|seat| self.player(seat)),
            (None, _) => None,
        }
    }

    /// Grid is full and nobody has a connection anywhere.
    pub fn check_tie(&self) -> bool {
        self.board.is_full()
            && !self.board.has_connection(Cell::PlayerA)
            && !self.board.has_connection(Cell::PlayerB)
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        if let Some(winner) = self.validate_connect() {
            Some(GameOutcome::Winner(winner))
        } else if self.check_tie() {
            Some(GameOutcome::Tie)
        } else {
            None
        }
    }

    pub fn grid_snapshot(&self) -> GridSnapshot {
        self.board.snapshot()
    }
}
