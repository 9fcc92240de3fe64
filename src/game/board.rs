use serde::{Deserialize, Serialize};

/// Number of contiguous tokens that make a connection.
pub const CONNECT: usize = 4;

/// Axis directions scanned for connections, in the order they are checked:
/// horizontal, vertical, diagonal `\`, diagonal `/`.
pub const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cell {
    Empty,
    PlayerA,
    PlayerB,
}

impl Cell {
    /// Renderer code: 0 = empty, 1 = first player, 2 = second player
    pub fn code(self) -> u8 {
        match self {
            Cell::Empty => 0,
            Cell::PlayerA => 1,
            Cell::PlayerB => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveError {
    ColumnFull,
    InvalidColumn,
}

/// Gravity-fed grid of `rows × cols` cells, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl Board {
    /// Create a new empty board
    pub fn new(rows: usize, cols: usize) -> Self {
        Board {
            rows,
            cols,
            cells: vec![Cell::Empty; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Get the cell at a specific position
    /// Row 0 is the top, row `rows - 1` is the bottom
    pub fn get(&self, row: usize, col: usize) -> Cell {
        self.cells[row * self.cols + col]
    }

    /// Like [`Board::get`] but for signed coordinates that may fall off the grid.
    fn cell_at(&self, row: isize, col: isize) -> Option<Cell> {
        if row < 0 || col < 0 {
            return None;
        }
        let (row, col) = (row as usize, col as usize);
        if row >= self.rows || col >= self.cols {
            return None;
        }
        Some(self.get(row, col))
    }

    fn set(&mut self, row: usize, col: usize, cell: Cell) {
        self.cells[row * self.cols + col] = cell;
    }

    /// Check if a column is full. Out-of-range columns count as full.
    /// A spun column can hold chips above empty cells, so this looks for
    /// any empty cell rather than only the top one.
    pub fn is_column_full(&self, col: usize) -> bool {
        col >= self.cols || self.landing_row(col).is_err()
    }

    /// Row a chip dropped into `col` would land on
    pub fn landing_row(&self, col: usize) -> Result<usize, MoveError> {
        if col >= self.cols {
            return Err(MoveError::InvalidColumn);
        }

        // Scan from the bottom: after a spin, empty cells may sit below chips.
        (0..self.rows)
            .rev()
            .find(|&row| self.get(row, col) == Cell::Empty)
            .ok_or(MoveError::ColumnFull)
    }

    /// Drop a piece in a column, returns the row where it landed
    pub fn drop_piece(&mut self, col: usize, cell: Cell) -> Result<usize, MoveError> {
        let row = self.landing_row(col)?;
        self.set(row, col, cell);
        Ok(row)
    }

    /// Reverse a column top-to-bottom. Empty cells travel with the flip, so
    /// chips are not re-settled afterwards.
    pub fn spin_column(&mut self, col: usize) -> Result<(), MoveError> {
        if col >= self.cols {
            return Err(MoveError::InvalidColumn);
        }

        let (mut top, mut bottom) = (0, self.rows);
        while top + 1 < bottom {
            bottom -= 1;
            let upper = self.get(top, col);
            let lower = self.get(bottom, col);
            self.set(top, col, lower);
            self.set(bottom, col, upper);
            top += 1;
        }
        Ok(())
    }

    /// Cells of one column, top to bottom
    #[cfg(test)]
    pub fn column(&self, col: usize) -> Vec<Cell> {
        (0..self.rows).map(|row| self.get(row, col)).collect()
    }

    /// Check if the board has no empty cell left
    pub fn is_full(&self) -> bool {
        !self.cells.contains(&Cell::Empty)
    }

    /// Length of the run of same-valued cells through (row, col) along one
    /// axis, looking at most `CONNECT - 1` cells each way.
    fn run_length(&self, row: usize, col: usize, (dr, dc): (isize, isize)) -> usize {
        let cell = self.get(row, col);
        let mut count = 1;

        for sign in [1, -1] {
            for step in 1..CONNECT as isize {
                let r = row as isize + sign * dr * step;
                let c = col as isize + sign * dc * step;
                if self.cell_at(r, c) != Some(cell) {
                    break;
                }
                count += 1;
            }
        }

        count
    }

    /// Token that has a connection through (row, col), if any
    pub fn connection_at(&self, row: usize, col: usize) -> Option<Cell> {
        let cell = self.get(row, col);
        if cell == Cell::Empty {
            return None;
        }

        DIRECTIONS
            .iter()
            .any(|&dir| self.run_length(row, col, dir) >= CONNECT)
            .then_some(cell)
    }

    /// Check whether `cell` has a connection anywhere on the board
    pub fn has_connection(&self, cell: Cell) -> bool {
        if cell == Cell::Empty {
            return false;
        }

        (0..self.rows).any(|row| {
            (0..self.cols).any(|col| {
                self.get(row, col) == cell && self.connection_at(row, col).is_some()
            })
        })
    }

    /// Immutable row-major copy for renderers
    pub fn snapshot(&self) -> GridSnapshot {
        GridSnapshot {
            cells: self.cells.chunks(self.cols.max(1)).map(<[Cell]>::to_vec).collect(),
            columns: self.cols,
        }
    }
}

/// Row-major copy of the grid handed to renderers. Row 0 is the top.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridSnapshot {
    cells: Vec<Vec<Cell>>,
    #[serde(skip)]
    columns: usize,
}

impl GridSnapshot {
    pub fn rows(&self) -> usize {
        self.cells.len()
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn get(&self, row: usize, col: usize) -> Cell {
        self.cells[row][col]
    }

    /// Iterate rows from top to bottom
    pub fn iter_rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.iter().map(Vec::as_slice)
    }

    /// Matrix of renderer codes (see [`Cell::code`])
    pub fn to_codes(&self) -> Vec<Vec<u8>> {
        self.cells
            .iter()
            .map(|row| row.iter().map(|cell| cell.code()).collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const ROWS: usize = 6;
    const COLS: usize = 7;

    #[test]
    fn test_new_board_is_empty() {
        let board = Board::new(ROWS, COLS);
        for row in 0..ROWS {
            for col in 0..COLS {
                assert_eq!(board.get(row, col), Cell::Empty);
            }
        }
    }

    #[test]
    fn test_drop_piece() {
        let mut board = Board::new(ROWS, COLS);

        let row = board.drop_piece(3, Cell::PlayerA).unwrap();
        assert_eq!(row, 5); // Should land at bottom
        assert_eq!(board.get(5, 3), Cell::PlayerA);

        let row = board.drop_piece(3, Cell::PlayerB).unwrap();
        assert_eq!(row, 4); // Should land on top of first piece
        assert_eq!(board.get(4, 3), Cell::PlayerB);
    }

    #[test]
    fn test_column_full() {
        let mut board = Board::new(ROWS, COLS);
        for _ in 0..ROWS {
            board.drop_piece(0, Cell::PlayerA).unwrap();
        }

        assert!(board.is_column_full(0));
        assert_eq!(board.drop_piece(0, Cell::PlayerB), Err(MoveError::ColumnFull));
    }

    #[test]
    fn test_invalid_column() {
        let mut board = Board::new(ROWS, COLS);
        assert_eq!(board.drop_piece(7, Cell::PlayerA), Err(MoveError::InvalidColumn));
        assert_eq!(board.spin_column(7), Err(MoveError::InvalidColumn));
    }

    #[test]
    fn test_spin_reverses_column() {
        let mut board = Board::new(4, 5);
        board.drop_piece(1, Cell::PlayerA).unwrap();
        board.drop_piece(1, Cell::PlayerB).unwrap();

        board.spin_column(1).unwrap();
        assert_eq!(
            board.column(1),
            vec![Cell::PlayerA, Cell::PlayerB, Cell::Empty, Cell::Empty]
        );
    }

    #[test]
    fn test_spin_odd_height_keeps_middle() {
        let mut board = Board::new(5, 5);
        for cell in [Cell::PlayerA, Cell::PlayerB, Cell::PlayerA] {
            board.drop_piece(2, cell).unwrap();
        }

        board.spin_column(2).unwrap();
        assert_eq!(
            board.column(2),
            vec![Cell::PlayerA, Cell::PlayerB, Cell::PlayerA, Cell::Empty, Cell::Empty]
        );
    }

    #[test]
    fn test_landing_row_after_spin_fills_bottom_gap() {
        let mut board = Board::new(4, 5);
        board.drop_piece(0, Cell::PlayerA).unwrap();
        board.spin_column(0).unwrap();

        // The chip now hangs at the top; the next chip fills the bottom.
        assert_eq!(board.landing_row(0), Ok(3));
        assert!(!board.is_column_full(0));
    }

    #[test]
    fn test_column_with_gap_below_chip_is_not_full() {
        let mut board = Board::new(4, 5);
        board.drop_piece(0, Cell::PlayerA).unwrap();
        board.spin_column(0).unwrap();
        assert_eq!(board.get(0, 0), Cell::PlayerA);
        assert!(!board.is_column_full(0));

        for _ in 0..3 {
            board.drop_piece(0, Cell::PlayerB).unwrap();
        }
        assert!(board.is_column_full(0));
        assert!(board.is_column_full(5));
    }

    #[test]
    fn test_full_board() {
        let mut board = Board::new(ROWS, COLS);
        for col in 0..COLS {
            for _ in 0..ROWS {
                board.drop_piece(col, Cell::PlayerA).unwrap();
            }
        }
        assert!(board.is_full());
    }

    #[test]
    fn test_horizontal_win() {
        let mut board = Board::new(ROWS, COLS);
        for col in 0..4 {
            board.drop_piece(col, Cell::PlayerA).unwrap();
        }
        assert_eq!(board.connection_at(5, 2), Some(Cell::PlayerA));
    }

    #[test]
    fn test_vertical_win() {
        let mut board = Board::new(ROWS, COLS);
        for _ in 0..4 {
            board.drop_piece(3, Cell::PlayerB).unwrap();
        }
        assert_eq!(board.connection_at(2, 3), Some(Cell::PlayerB));
        // Any cell of the run works, not only the top one
        assert_eq!(board.connection_at(4, 3), Some(Cell::PlayerB));
    }

    #[test]
    fn test_diagonal_up_win() {
        let mut board = Board::new(ROWS, COLS);
        board.drop_piece(0, Cell::PlayerA).unwrap();

        board.drop_piece(1, Cell::PlayerB).unwrap();
        board.drop_piece(1, Cell::PlayerA).unwrap();

        board.drop_piece(2, Cell::PlayerB).unwrap();
        board.drop_piece(2, Cell::PlayerB).unwrap();
        board.drop_piece(2, Cell::PlayerA).unwrap();

        board.drop_piece(3, Cell::PlayerB).unwrap();
        board.drop_piece(3, Cell::PlayerB).unwrap();
        board.drop_piece(3, Cell::PlayerB).unwrap();
        let row = board.drop_piece(3, Cell::PlayerA).unwrap();

        assert_eq!(board.connection_at(row, 3), Some(Cell::PlayerA));
    }

    #[test]
    fn test_diagonal_down_win() {
        let mut board = Board::new(ROWS, COLS);
        board.drop_piece(6, Cell::PlayerA).unwrap();

        board.drop_piece(5, Cell::PlayerB).unwrap();
        board.drop_piece(5, Cell::PlayerA).unwrap();

        board.drop_piece(4, Cell::PlayerB).unwrap();
        board.drop_piece(4, Cell::PlayerB).unwrap();
        board.drop_piece(4, Cell::PlayerA).unwrap();

        board.drop_piece(3, Cell::PlayerB).unwrap();
        board.drop_piece(3, Cell::PlayerB).unwrap();
        board.drop_piece(3, Cell::PlayerB).unwrap();
        let row = board.drop_piece(3, Cell::PlayerA).unwrap();

        assert_eq!(board.connection_at(row, 3), Some(Cell::PlayerA));
    }

    #[test]
    fn test_no_win_with_three() {
        let mut board = Board::new(ROWS, COLS);
        for col in 0..3 {
            board.drop_piece(col, Cell::PlayerA).unwrap();
        }
        assert_eq!(board.connection_at(5, 1), None);
        assert!(!board.has_connection(Cell::PlayerA));
    }

    #[test]
    fn test_has_connection_finds_run_anywhere() {
        let mut board = Board::new(ROWS, COLS);
        for col in 2..6 {
            board.drop_piece(col, Cell::PlayerB).unwrap();
        }
        board.drop_piece(0, Cell::PlayerA).unwrap();

        assert!(board.has_connection(Cell::PlayerB));
        assert!(!board.has_connection(Cell::PlayerA));
        assert!(!board.has_connection(Cell::Empty));
    }

    #[test]
    fn test_snapshot_codes() {
        let mut board = Board::new(4, 5);
        board.drop_piece(0, Cell::PlayerA).unwrap();
        board.drop_piece(4, Cell::PlayerB).unwrap();

        let snapshot = board.snapshot();
        assert_eq!(snapshot.rows(), 4);
        assert_eq!(snapshot.columns(), 5);
        assert_eq!(snapshot.to_codes()[3], vec![1, 0, 0, 0, 2]);
        assert_eq!(snapshot.to_codes()[0], vec![0; 5]);
    }

    proptest! {
        #[test]
        fn prop_drop_lands_on_lowest_empty_row(
            drops in proptest::collection::vec(0usize..5, 0..30),
            col in 0usize..5,
        ) {
            let mut board = Board::new(6, 5);
            for c in drops {
                let _ = board.drop_piece(c, Cell::PlayerA);
            }

            let expected = (0..6).rev().find(|&r| board.get(r, col) == Cell::Empty);
            match board.drop_piece(col, Cell::PlayerB) {
                Ok(row) => prop_assert_eq!(Some(row), expected),
                Err(e) => {
                    prop_assert_eq!(e, MoveError::ColumnFull);
                    prop_assert_eq!(expected, None);
                }
            }
        }

        #[test]
        fn prop_spin_twice_restores_column(
            drops in proptest::collection::vec((0usize..5, any::<bool>()), 0..30),
            col in 0usize..5,
        ) {
            let mut board = Board::new(6, 5);
            for (c, first) in drops {
                let cell = if first { Cell::PlayerA } else { Cell::PlayerB };
                let _ = board.drop_piece(c, cell);
            }

            let before = board.clone();
            board.spin_column(col).unwrap();
            board.spin_column(col).unwrap();
            prop_assert_eq!(board, before);
        }
    }
}
