//! Core domain types for checkers.

use serde::{Deserialize, Serialize};

/// One of the two opposing sides.
///
/// Pieces belong to a team, never to a physical seat: in four-seat mode two
/// seats share one team's pieces.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::EnumIter, derive_more::Display,
)]
pub enum Team {
    /// Moves first, advances towards increasing rows.
    #[display("Team A")]
    A,
    /// Advances towards row 0.
    #[display("Team B")]
    B,
}

impl Team {
    /// Returns the opposing team.
    pub fn opponent(self) -> Self {
        match self {
            Team::A => Team::B,
            Team::B => Team::A,
        }
    }

    /// Row delta of a forward step for this team's men.
    pub fn forward(self) -> i32 {
        match self {
            Team::A => 1,
            Team::B => -1,
        }
    }

    /// The row on which this team's men are crowned.
    pub fn promotion_row(self, rows: i32) -> i32 {
        match self {
            Team::A => rows - 1,
            Team::B => 0,
        }
    }
}

/// Contents of a single board cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PieceKind {
    /// No piece.
    #[default]
    Empty,
    /// An uncrowned piece, moves forward only.
    Man(Team),
    /// A crowned piece, moves in both row directions.
    King(Team),
}

impl PieceKind {
    /// Returns the owning team, if any.
    pub fn team(self) -> Option<Team> {
        match self {
            PieceKind::Empty => None,
            PieceKind::Man(team) | PieceKind::King(team) => Some(team),
        }
    }

    /// True if the cell holds no piece.
    pub fn is_empty(self) -> bool {
        self == PieceKind::Empty
    }

    /// True if the piece is crowned.
    pub fn is_king(self) -> bool {
        matches!(self, PieceKind::King(_))
    }

    /// True if the piece belongs to `team`.
    pub fn belongs_to(self, team: Team) -> bool {
        self.team() == Some(team)
    }

    /// True if the piece belongs to the opponent of `team`.
    pub fn is_enemy_of(self, team: Team) -> bool {
        self.team() == Some(team.opponent())
    }

    /// Returns the crowned version of a man; other values are unchanged.
    pub fn crowned(self) -> Self {
        match self {
            PieceKind::Man(team) => PieceKind::King(team),
            other => other,
        }
    }

    /// Integer code used on the wire.
    ///
    /// `0` empty, `1` A man, `2` A king, `3` B man, `4` B king.
    pub fn code(self) -> i32 {
        match self {
            PieceKind::Empty => 0,
            PieceKind::Man(Team::A) => 1,
            PieceKind::King(Team::A) => 2,
            PieceKind::Man(Team::B) => 3,
            PieceKind::King(Team::B) => 4,
        }
    }

    /// Decodes a wire code. Unknown codes yield `None`.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(PieceKind::Empty),
            1 => Some(PieceKind::Man(Team::A)),
            2 => Some(PieceKind::King(Team::A)),
            3 => Some(PieceKind::Man(Team::B)),
            4 => Some(PieceKind::King(Team::B)),
            _ => None,
        }
    }
}

/// A 0-indexed board coordinate.
///
/// Coordinates are signed so that off-board neighbours can be computed and
/// then rejected by [`crate::BoardState::is_inside`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[display("({row},{col})")]
pub struct Position {
    /// Row index.
    pub row: i32,
    /// Column index.
    pub col: i32,
}

impl Position {
    /// Creates a position.
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Returns the position offset by `(d_row, d_col)`.
    pub fn offset(self, d_row: i32, d_col: i32) -> Self {
        Self::new(self.row + d_row, self.col + d_col)
    }

    /// Midpoint between two positions two diagonal steps apart.
    pub fn midpoint(self, other: Position) -> Self {
        Self::new((self.row + other.row) / 2, (self.col + other.col) / 2)
    }
}

/// A single diagonal move, either a step or a single capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    /// Origin cell.
    pub from: Position,
    /// Destination cell.
    pub to: Position,
    /// Cell of the jumped enemy piece, present only for captures.
    pub captured: Option<Position>,
}

impl Move {
    /// Creates a non-capturing step.
    pub fn step(from: Position, to: Position) -> Self {
        Self {
            from,
            to,
            captured: None,
        }
    }

    /// Creates a capture over `captured`.
    pub fn capture(from: Position, to: Position, captured: Position) -> Self {
        Self {
            from,
            to,
            captured: Some(captured),
        }
    }

    /// True if the move jumps an enemy piece.
    pub fn is_capture(&self) -> bool {
        self.captured.is_some()
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.captured {
            Some(captured) => write!(f, "{} x{} -> {}", self.from, captured, self.to),
            None => write!(f, "{} -> {}", self.from, self.to),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_piece_codes_cover_all_kinds() {
        for code in 0..=4 {
            let piece = PieceKind::from_code(code).expect("known code");
            assert_eq!(piece.code(), code);
        }
        assert_eq!(PieceKind::from_code(5), None);
        assert_eq!(PieceKind::from_code(-1), None);
    }

    #[test]
    fn test_crowning_keeps_team() {
        assert_eq!(PieceKind::Man(Team::B).crowned(), PieceKind::King(Team::B));
        assert_eq!(PieceKind::King(Team::A).crowned(), PieceKind::King(Team::A));
        assert_eq!(PieceKind::Empty.crowned(), PieceKind::Empty);
    }

    #[test]
    fn test_enemy_detection() {
        assert!(PieceKind::Man(Team::B).is_enemy_of(Team::A));
        assert!(!PieceKind::Man(Team::A).is_enemy_of(Team::A));
        assert!(!PieceKind::Empty.is_enemy_of(Team::A));
    }

    #[test]
    fn test_teams_move_in_opposite_directions() {
        assert_eq!(Team::A.forward(), -Team::B.forward());
        assert_eq!(Team::A.promotion_row(8), 7);
        assert_eq!(Team::B.promotion_row(8), 0);
    }
}
