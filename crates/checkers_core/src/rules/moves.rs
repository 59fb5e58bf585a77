//! Move generation.

use crate::board::BoardState;
use crate::types::{Move, Position, Team};
use tracing::instrument;

const COL_DIRS: [i32; 2] = [-1, 1];

/// Returns every legal step and single capture for the piece at `from`.
///
/// Empty if the cell is off-board, empty, or not owned by `team`. Men only
/// look along their team's forward row direction, kings look both ways.
/// Steps and captures are returned together; there is no forced capture.
#[instrument(skip(board))]
pub fn legal_moves(board: &BoardState, from: Position, team: Team) -> Vec<Move> {
    let mut moves = Vec::new();
    let Some(piece) = board.get(from) else {
        return moves;
    };
    if !piece.belongs_to(team) {
        return moves;
    }

    let row_dirs: &[i32] = if piece.is_king() {
        &[1, -1]
    } else if team.forward() > 0 {
        &[1]
    } else {
        &[-1]
    };

    for &d_row in row_dirs {
        for d_col in COL_DIRS {
            let near = from.offset(d_row, d_col);
            match board.get(near) {
                Some(cell) if cell.is_empty() => moves.push(Move::step(from, near)),
                Some(cell) if cell.is_enemy_of(team) => {
                    let landing = near.offset(d_row, d_col);
                    if board.get(landing).is_some_and(|p| p.is_empty()) {
                        moves.push(Move::capture(from, landing, near));
                    }
                }
                _ => {}
            }
        }
    }

    moves
}

/// True if any piece of `team` has at least one legal move.
#[instrument(skip(board))]
pub fn team_has_any_move(board: &BoardState, team: Team) -> bool {
    board
        .pieces_of(team)
        .any(|pos| !legal_moves(board, pos, team).is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PieceKind;

    fn board_with(pieces: &[(i32, i32, PieceKind)]) -> BoardState {
        let mut board = BoardState::new(6, 6).expect("valid size");
        for &(row, col, piece) in pieces {
            board.set(Position::new(row, col), piece).expect("inside");
        }
        board
    }

    #[test]
    fn test_man_steps_forward_only() {
        let board = board_with(&[(2, 2, PieceKind::Man(Team::A))]);
        let targets: Vec<_> = legal_moves(&board, Position::new(2, 2), Team::A)
            .into_iter()
            .map(|m| m.to)
            .collect();
        assert_eq!(targets, vec![Position::new(3, 1), Position::new(3, 3)]);
    }

    #[test]
    fn test_team_b_man_moves_towards_row_zero() {
        let board = board_with(&[(3, 3, PieceKind::Man(Team::B))]);
        let moves = legal_moves(&board, Position::new(3, 3), Team::B);
        assert_eq!(moves.len(), 2);
        assert!(moves.iter().all(|m| m.to.row == 2));
    }

    #[test]
    fn test_king_moves_both_directions() {
        let board = board_with(&[(2, 2, PieceKind::King(Team::A))]);
        assert_eq!(legal_moves(&board, Position::new(2, 2), Team::A).len(), 4);
    }

    #[test]
    fn test_foreign_piece_has_no_moves() {
        let board = board_with(&[(2, 2, PieceKind::Man(Team::A))]);
        assert!(legal_moves(&board, Position::new(2, 2), Team::B).is_empty());
        assert!(legal_moves(&board, Position::new(0, 0), Team::A).is_empty());
        assert!(legal_moves(&board, Position::new(-1, 7), Team::A).is_empty());
    }

    #[test]
    fn test_capture_returned_alongside_steps() {
        let board = board_with(&[
            (2, 2, PieceKind::Man(Team::A)),
            (3, 3, PieceKind::Man(Team::B)),
        ]);
        let moves = legal_moves(&board, Position::new(2, 2), Team::A);
        assert_eq!(
            moves,
            vec![
                Move::step(Position::new(2, 2), Position::new(3, 1)),
                Move::capture(Position::new(2, 2), Position::new(4, 4), Position::new(3, 3)),
            ]
        );
    }

    #[test]
    fn test_blocked_capture_and_edge() {
        let board = board_with(&[
            (4, 4, PieceKind::Man(Team::A)),
            (5, 5, PieceKind::Man(Team::B)),
            (5, 3, PieceKind::Man(Team::A)),
        ]);
        // Landing square (6,6) is off-board and (5,3) is friendly.
        assert!(legal_moves(&board, Position::new(4, 4), Team::A).is_empty());
    }

    #[test]
    fn test_friendly_piece_is_not_jumped() {
        let board = board_with(&[
            (2, 2, PieceKind::Man(Team::A)),
            (3, 3, PieceKind::Man(Team::A)),
        ]);
        let moves = legal_moves(&board, Position::new(2, 2), Team::A);
        assert!(moves.iter().all(|m| !m.is_capture()));
        assert_eq!(moves.len(), 1);
    }

    #[test]
    fn test_team_has_any_move() {
        let board = board_with(&[
            (5, 0, PieceKind::Man(Team::A)),
            (0, 1, PieceKind::Man(Team::B)),
        ]);
        // Both men sit on their promotion rows facing off the board.
        assert!(!team_has_any_move(&board, Team::A));
        assert!(!team_has_any_move(&board, Team::B));
    }
}
