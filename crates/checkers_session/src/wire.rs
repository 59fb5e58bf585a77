//! Wire messages exchanged between host and peers.
//!
//! Every message carries only primitive fields. Frames are single-line JSON
//! documents terminated by `\n`.

use crate::error::SessionError;
use checkers_core::{BoardState, PieceKind, Position, Seat, Team};
use derive_new::new;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// A peer's proposed move, sent to the host for validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, new)]
pub struct MoveIntent {
    /// Origin row.
    pub from_row: i32,
    /// Origin column.
    pub from_col: i32,
    /// Destination row.
    pub to_row: i32,
    /// Destination column.
    pub to_col: i32,
}

impl MoveIntent {
    /// Builds an intent from two positions.
    pub fn between(from: Position, to: Position) -> Self {
        Self::new(from.row, from.col, to.row, to.col)
    }

    /// Origin cell.
    pub fn origin(&self) -> Position {
        Position::new(self.from_row, self.from_col)
    }

    /// Destination cell.
    pub fn target(&self) -> Position {
        Position::new(self.to_row, self.to_col)
    }
}

/// Full board and match state, sent after every change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Board rows.
    pub rows: i32,
    /// Board columns.
    pub cols: i32,
    /// Length of `pieces`.
    pub piece_count: i32,
    /// Piece codes in row-major order, see [`PieceKind::code`].
    pub pieces: Vec<i32>,
    /// Captures made by team A.
    pub score_a: i32,
    /// Captures made by team B.
    pub score_b: i32,
    /// Seat number resolved to act for the current team.
    pub current_acting_seat: i32,
    /// True once the game has a winner.
    pub is_over: bool,
    /// True while the match is running.
    pub is_started: bool,
}

impl Snapshot {
    /// Flattens `board` into snapshot form.
    pub fn capture(
        board: &BoardState,
        score_a: u32,
        score_b: u32,
        acting_seat: Seat,
        is_over: bool,
        is_started: bool,
    ) -> Self {
        let pieces: Vec<i32> = board.cells().iter().map(|p| p.code()).collect();
        Self {
            rows: board.rows(),
            cols: board.cols(),
            piece_count: pieces.len() as i32,
            pieces,
            score_a: score_a as i32,
            score_b: score_b as i32,
            current_acting_seat: acting_seat.number(),
            is_over,
            is_started,
        }
    }

    /// Rebuilds the board carried by this snapshot.
    ///
    /// # Errors
    ///
    /// Fails on non-positive dimensions, a piece count that does not match
    /// the board area, or an unknown piece code.
    #[instrument(skip(self), fields(rows = self.rows, cols = self.cols))]
    pub fn board(&self) -> Result<BoardState, SessionError> {
        if self.piece_count as usize != self.pieces.len() {
            return Err(SessionError::new(format!(
                "Snapshot declares {} pieces but carries {}",
                self.piece_count,
                self.pieces.len()
            )));
        }
        let cells = self
            .pieces
            .iter()
            .map(|&code| {
                PieceKind::from_code(code)
                    .ok_or_else(|| SessionError::new(format!("Unknown piece code {}", code)))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(BoardState::from_cells(self.rows, self.cols, cells)?)
    }

    /// Seat acting for the current team, if the number is valid.
    pub fn acting_seat(&self) -> Option<Seat> {
        Seat::from_number(self.current_acting_seat)
    }
}

/// Seat granted to a connecting peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatAssignment {
    /// Seat number 1-4, `0` for spectators.
    pub seat: i32,
    /// True if the peer is a read-only spectator.
    pub is_spectator: bool,
}

impl SeatAssignment {
    /// Assignment for a seated player.
    pub fn seated(seat: Seat) -> Self {
        Self {
            seat: seat.number(),
            is_spectator: false,
        }
    }

    /// Assignment for a spectator.
    pub fn spectator() -> Self {
        Self {
            seat: 0,
            is_spectator: true,
        }
    }
}

/// Match-level control signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "signal", rename_all = "snake_case")]
pub enum ControlSignal {
    /// The join quorum is met and moves are accepted.
    MatchStarted,
    /// Team B has no seated player; the match is paused.
    WaitingForOpponent,
    /// The game ended.
    MatchOver {
        /// Winning team.
        winning_team: Team,
    },
    /// The board was reset to its starting layout.
    BoardReset,
    /// Capture scores changed.
    ScoreChanged {
        /// Captures made by team A.
        score_a: i32,
        /// Captures made by team B.
        score_b: i32,
    },
    /// Leave the match and go back to the pre-match screen.
    ReturnToMenu,
}

/// Host to peer messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, strum::IntoStaticStr)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum HostMessage {
    /// Full state.
    Snapshot(Snapshot),
    /// Directed seat assignment.
    SeatAssignment(SeatAssignment),
    /// Control signal.
    Control(ControlSignal),
}

/// Peer to host messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, strum::IntoStaticStr)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum PeerMessage {
    /// Proposed move.
    MoveIntent(MoveIntent),
    /// Ask for a fresh snapshot.
    RequestSnapshot,
    /// Ask the host to send everyone back to the menu.
    RequestReturnToMenu,
}

impl HostMessage {
    /// Variant name, for logging.
    pub fn kind(&self) -> &'static str {
        self.into()
    }
}

impl PeerMessage {
    /// Variant name, for logging.
    pub fn kind(&self) -> &'static str {
        self.into()
    }
}

/// Encodes a message as one JSON line, newline included.
pub fn encode_line<T: Serialize>(message: &T) -> Result<String, SessionError> {
    let mut line = serde_json::to_string(message)?;
    line.push('\n');
    Ok(line)
}

/// Decodes one JSON line.
pub fn decode_line<T: DeserializeOwned>(line: &str) -> Result<T, SessionError> {
    Ok(serde_json::from_str(line.trim_end())?)
}
