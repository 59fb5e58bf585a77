//! Initial piece placement strategies.

use crate::board::BoardState;
use crate::types::{PieceKind, Position, Team};
use tracing::{debug, instrument};

/// Populates a board with its starting position.
pub trait BoardLayout {
    /// Overwrites every cell of `board` with the starting position.
    fn setup(&self, board: &mut BoardState);
}

/// Standard draughts layout.
///
/// Fills `rows_per_side` rows at each end with men on the cells where
/// `(row + col) % 2 == 1`. Team A takes the low rows, team B the high rows.
/// `rows_per_side` is clamped to half the board height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StandardLayout {
    rows_per_side: i32,
}

impl StandardLayout {
    /// Creates a layout with the given number of rows per side.
    pub fn new(rows_per_side: i32) -> Self {
        Self { rows_per_side }
    }

    /// Rows per side before clamping.
    pub fn rows_per_side(&self) -> i32 {
        self.rows_per_side
    }
}

impl Default for StandardLayout {
    fn default() -> Self {
        Self::new(2)
    }
}

impl BoardLayout for StandardLayout {
    #[instrument(skip(board), fields(rows = board.rows(), cols = board.cols()))]
    fn setup(&self, board: &mut BoardState) {
        board.clear();

        let rows = board.rows();
        let per_side = self.rows_per_side.clamp(0, rows / 2);
        debug!(per_side, "Placing starting pieces");

        let bands = [(0..per_side, Team::A), (rows - per_side..rows, Team::B)];
        for (band, team) in bands {
            for row in band {
                for col in 0..board.cols() {
                    if (row + col) % 2 == 1 {
                        let placed = board.set(Position::new(row, col), PieceKind::Man(team));
                        debug_assert!(placed.is_ok(), "layout loop left the board: {placed:?}");
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_per_side_is_clamped() {
        let mut board = BoardState::new(3, 4).expect("valid size");
        StandardLayout::new(5).setup(&mut board);
        // rows / 2 == 1, so only row 0 and row 2 are populated
        assert_eq!(board.count(Team::A), 2);
        assert_eq!(board.count(Team::B), 2);
        assert!(board.cells()[4..8].iter().all(|p| p.is_empty()));
    }

    #[test]
    fn test_setup_clears_previous_contents() {
        let mut board = BoardState::new(6, 6).expect("valid size");
        board
            .set(Position::new(3, 3), PieceKind::King(Team::B))
            .expect("inside");
        StandardLayout::default().setup(&mut board);
        assert_eq!(board.get(Position::new(3, 3)), Some(PieceKind::Empty));
    }
}
