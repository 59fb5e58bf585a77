//! Fixed-size grid of cells.

use crate::types::{PieceKind, Position, Team};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Errors raised by board construction and cell access.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum BoardError {
    /// Rows or columns were not positive.
    #[display("Board size must be positive, got {rows}x{cols}")]
    InvalidDimensions {
        /// Requested rows.
        rows: i32,
        /// Requested columns.
        cols: i32,
    },
    /// Rows times columns does not fit the cell index type.
    #[display("Board size {rows}x{cols} is too large")]
    TooLarge {
        /// Requested rows.
        rows: i32,
        /// Requested columns.
        cols: i32,
    },
    /// A position outside the grid was addressed.
    #[display("Position {_0} is outside the board")]
    OutOfBounds(#[error(not(source))] Position),
    /// A flattened cell array did not match the board area.
    #[display("Expected {expected} cells, got {actual}")]
    CellCount {
        /// Rows times columns.
        expected: usize,
        /// Cells supplied.
        actual: usize,
    },
}

/// A `rows x cols` grid holding one [`PieceKind`] per cell.
///
/// Dimensions are fixed at construction. No piece legality is checked here,
/// that belongs to the rules module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardState {
    rows: i32,
    cols: i32,
    /// Cells in row-major order.
    cells: Vec<PieceKind>,
}

impl BoardState {
    /// Creates an empty board.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::InvalidDimensions`] if either dimension is not
    /// positive, [`BoardError::TooLarge`] if the area overflows.
    #[instrument]
    pub fn new(rows: i32, cols: i32) -> Result<Self, BoardError> {
        let area = Self::area(rows, cols)?;
        Ok(Self {
            rows,
            cols,
            cells: vec![PieceKind::Empty; area],
        })
    }

    /// Cell count of a `rows x cols` board, validated without allocating.
    pub fn area(rows: i32, cols: i32) -> Result<usize, BoardError> {
        if rows <= 0 || cols <= 0 {
            return Err(BoardError::InvalidDimensions { rows, cols });
        }
        rows.checked_mul(cols)
            .map(|area| area as usize)
            .ok_or(BoardError::TooLarge { rows, cols })
    }

    /// Rebuilds a board from a row-major cell array.
    ///
    /// The cell count is checked before anything is allocated.
    #[instrument(skip(cells))]
    pub fn from_cells(rows: i32, cols: i32, cells: Vec<PieceKind>) -> Result<Self, BoardError> {
        let expected = Self::area(rows, cols)?;
        if cells.len() != expected {
            return Err(BoardError::CellCount {
                expected,
                actual: cells.len(),
            });
        }
        Ok(Self { rows, cols, cells })
    }

    /// Number of rows.
    pub fn rows(&self) -> i32 {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> i32 {
        self.cols
    }

    /// True if `pos` lies on the board.
    pub fn is_inside(&self, pos: Position) -> bool {
        pos.row >= 0 && pos.row < self.rows && pos.col >= 0 && pos.col < self.cols
    }

    fn index(&self, pos: Position) -> Option<usize> {
        self.is_inside(pos)
            .then(|| (pos.row * self.cols + pos.col) as usize)
    }

    /// Returns the cell at `pos`, or `None` when off-board.
    pub fn get(&self, pos: Position) -> Option<PieceKind> {
        self.index(pos).map(|i| self.cells[i])
    }

    /// Writes the cell at `pos`.
    pub fn set(&mut self, pos: Position, piece: PieceKind) -> Result<(), BoardError> {
        let i = self.index(pos).ok_or(BoardError::OutOfBounds(pos))?;
        self.cells[i] = piece;
        Ok(())
    }

    /// Empties every cell.
    pub fn clear(&mut self) {
        self.cells.fill(PieceKind::Empty);
    }

    /// Cells in row-major order.
    pub fn cells(&self) -> &[PieceKind] {
        &self.cells
    }

    /// Iterates every position in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.rows).flat_map(move |row| (0..self.cols).map(move |col| Position::new(row, col)))
    }

    /// Positions of every piece owned by `team`.
    pub fn pieces_of(&self, team: Team) -> impl Iterator<Item = Position> + '_ {
        self.positions()
            .filter(move |pos| self.get(*pos).is_some_and(|p| p.belongs_to(team)))
    }

    /// Counts pieces owned by `team`.
    pub fn count(&self, team: Team) -> usize {
        self.cells.iter().filter(|p| p.belongs_to(team)).count()
    }

    /// Formats the board as text, row 0 at the top.
    ///
    /// `a`/`b` are men, `A`/`B` are kings, `.` is an empty cell.
    pub fn display(&self) -> String {
        let mut result = String::from("  ");
        for col in 0..self.cols {
            result.push_str(&format!("{}", col % 10));
        }
        for row in 0..self.rows {
            result.push('\n');
            result.push_str(&format!("{} ", row % 10));
            for col in 0..self.cols {
                let symbol = match self.get(Position::new(row, col)) {
                    Some(PieceKind::Man(Team::A)) => 'a',
                    Some(PieceKind::King(Team::A)) => 'A',
                    Some(PieceKind::Man(Team::B)) => 'b',
                    Some(PieceKind::King(Team::B)) => 'B',
                    _ => '.',
                };
                result.push(symbol);
            }
        }
        result
    }
}
