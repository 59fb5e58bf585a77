//! Terminal position detection.

use super::moves::team_has_any_move;
use crate::board::BoardState;
use crate::types::Team;
use tracing::{debug, instrument};

/// Checks whether the game is over after `current_team` has moved.
///
/// Returns `Some(winner)` when the position is terminal, `None` while play
/// continues. A team without pieces loses outright. Otherwise a team that has
/// pieces but no legal move loses. If both teams are blocked, `current_team`
/// wins because the opponent is the one unable to move.
#[instrument(skip(board))]
pub fn is_terminal(board: &BoardState, current_team: Team) -> Option<Team> {
    let a_pieces = board.count(Team::A);
    let b_pieces = board.count(Team::B);

    match (a_pieces, b_pieces) {
        (0, 0) => return None,
        (0, _) => return Some(Team::B),
        (_, 0) => return Some(Team::A),
        _ => {}
    }

    let a_moves = team_has_any_move(board, Team::A);
    let b_moves = team_has_any_move(board, Team::B);
    debug!(a_pieces, b_pieces, a_moves, b_moves, "Evaluated terminal conditions");

    match (a_moves, b_moves) {
        (true, true) => None,
        (false, true) => Some(Team::B),
        (true, false) => Some(Team::A),
        (false, false) => Some(current_team),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PieceKind, Position};

    fn board_with(pieces: &[(i32, i32, PieceKind)]) -> BoardState {
        let mut board = BoardState::new(6, 6).expect("valid size");
        for &(row, col, piece) in pieces {
            board.set(Position::new(row, col), piece).expect("inside");
        }
        board
    }

    #[test]
    fn test_team_without_pieces_loses() {
        let board = board_with(&[(1, 0, PieceKind::Man(Team::A))]);
        assert_eq!(is_terminal(&board, Team::A), Some(Team::A));
        assert_eq!(is_terminal(&board, Team::B), Some(Team::A));

        let board = board_with(&[(4, 1, PieceKind::King(Team::B))]);
        assert_eq!(is_terminal(&board, Team::A), Some(Team::B));
    }

    #[test]
    fn test_blocked_team_loses_to_mobile_team() {
        // A's only man sits on the last row and cannot move further.
        let board = board_with(&[
            (5, 0, PieceKind::Man(Team::A)),
            (3, 3, PieceKind::Man(Team::B)),
        ]);
        assert_eq!(is_terminal(&board, Team::A), Some(Team::B));
    }

    #[test]
    fn test_both_blocked_favours_mover() {
        let board = board_with(&[
            (5, 0, PieceKind::Man(Team::A)),
            (0, 1, PieceKind::Man(Team::B)),
        ]);
        assert_eq!(is_terminal(&board, Team::A), Some(Team::A));
        assert_eq!(is_terminal(&board, Team::B), Some(Team::B));
    }

    #[test]
    fn test_open_position_continues() {
        let board = board_with(&[
            (1, 0, PieceKind::Man(Team::A)),
            (4, 1, PieceKind::Man(Team::B)),
        ]);
        assert_eq!(is_terminal(&board, Team::A), None);
    }
}
