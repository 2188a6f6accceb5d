//! Board dimensions and cell coordinates.

use std::fmt;

use crate::error::GameError;
use crate::snake::Direction;

/// A cell address in board units. Values outside the board are legal to
/// hold (a head about to leave the board), just not to occupy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub col: i32,
    pub row: i32,
}

impl Position {
    pub fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    /// The neighbouring cell one step in `direction`.
    pub fn step(&self, direction: Direction) -> Position {
        let (dc, dr) = direction.offset();
        Position::new(self.col + dc, self.row + dr)
    }

    /// True if the two cells share an edge.
    pub fn is_adjacent(&self, other: &Position) -> bool {
        (self.col - other.col).abs() + (self.row - other.row).abs() == 1
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

/// The playing field. Immutable for the lifetime of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Board {
    columns: u16,
    rows: u16,
    cell_size: u16,
}

impl Board {
    pub fn new(columns: u16, rows: u16, cell_size: u16) -> Result<Self, GameError> {
        if columns == 0 || rows == 0 || cell_size == 0 {
            return Err(GameError::InvalidBoard { columns, rows, cell_size });
        }

        Ok(Board { columns, rows, cell_size })
    }

    /// Sizes a board to fill a viewport measured in the same units as
    /// `cell_size` (pixels for a canvas, characters for a terminal).
    /// Partial cells at the right and bottom edges are dropped.
    pub fn fit(width: u16, height: u16, cell_size: u16) -> Result<Self, GameError> {
        if cell_size == 0 {
            return Err(GameError::InvalidBoard { columns: 0, rows: 0, cell_size });
        }

        Board::new(width / cell_size, height / cell_size, cell_size)
    }

    pub fn columns(&self) -> u16 {
        self.columns
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    pub fn cell_size(&self) -> u16 {
        self.cell_size
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.col >= 0 && pos.row >= 0 && pos.col < self.columns as i32 && pos.row < self.rows as i32
    }

    /// True for cells in the outermost ring of the board.
    pub fn is_border(&self, pos: Position) -> bool {
        self.contains(pos)
            && (pos.col == 0
                || pos.row == 0
                || pos.col == self.columns as i32 - 1
                || pos.row == self.rows as i32 - 1)
    }

    /// Every cell, row by row.
    pub fn cells(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.rows as i32).flat_map(move |row| (0..self.columns as i32).map(move |col| Position::new(col, row)))
    }
}
