//! Game orchestration: turn order, scores, promotion and game over.
//!
//! [`Game`] owns the canonical board. Every state change is published as a
//! [`GameEvent`] on the typed channels handed out by [`Game::subscribe`], so a
//! presentation layer and a network broadcaster can listen independently.

use crate::board::BoardState;
use crate::layout::BoardLayout;
use crate::rules::{is_terminal, legal_moves};
use crate::types::{Move, PieceKind, Position, Team};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument};

/// Lifecycle phase of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Board created but never reset; no moves accepted.
    AwaitingReset,
    /// Moves are accepted for the current team.
    InProgress,
    /// A winner has been decided.
    GameOver {
        /// Winning team.
        winner: Team,
    },
}

/// Notification emitted by [`Game`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// The board was repopulated from a layout.
    BoardReset,
    /// A move was applied to the board.
    MoveApplied(Move),
    /// The team to move changed.
    TurnChanged(Team),
    /// Capture scores changed.
    ScoreChanged {
        /// Captures made by team A.
        score_a: u32,
        /// Captures made by team B.
        score_b: u32,
    },
    /// The game ended.
    GameOver {
        /// Winning team.
        winner: Team,
    },
}

/// Checkers game engine.
#[derive(Debug)]
pub struct Game {
    board: BoardState,
    phase: Phase,
    current_team: Team,
    score_a: u32,
    score_b: u32,
    subscribers: Vec<mpsc::UnboundedSender<GameEvent>>,
}

impl Game {
    /// Creates a game around `board`, waiting for [`Game::reset`].
    #[instrument(skip(board), fields(rows = board.rows(), cols = board.cols()))]
    pub fn new(board: BoardState) -> Self {
        Self {
            board,
            phase: Phase::AwaitingReset,
            current_team: Team::A,
            score_a: 0,
            score_b: 0,
            subscribers: Vec::new(),
        }
    }

    /// Opens a new event channel. Dropped receivers are pruned on the next event.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<GameEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    fn emit(&mut self, event: GameEvent) {
        debug!(?event, subscribers = self.subscribers.len(), "Emitting game event");
        self.subscribers.retain(|tx| tx.send(event).is_ok());
    }

    /// Returns the board.
    pub fn board(&self) -> &BoardState {
        &self.board
    }

    /// Returns the lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Team whose turn it is.
    pub fn current_team(&self) -> Team {
        self.current_team
    }

    /// Captures made by team A.
    pub fn score_a(&self) -> u32 {
        self.score_a
    }

    /// Captures made by team B.
    pub fn score_b(&self) -> u32 {
        self.score_b
    }

    /// True once a winner has been decided.
    pub fn is_over(&self) -> bool {
        matches!(self.phase, Phase::GameOver { .. })
    }

    /// Winner, if the game is over.
    pub fn winner(&self) -> Option<Team> {
        match self.phase {
            Phase::GameOver { winner } => Some(winner),
            _ => None,
        }
    }

    /// Legal moves for the piece at `from` under the current team.
    pub fn valid_moves_from(&self, from: Position) -> Vec<Move> {
        legal_moves(&self.board, from, self.current_team)
    }

    /// Repopulates the board and starts a fresh game.
    ///
    /// Emits board-reset, turn-changed and score-changed, in that order.
    #[instrument(skip(self, layout))]
    pub fn reset(&mut self, layout: &impl BoardLayout) {
        layout.setup(&mut self.board);
        self.score_a = 0;
        self.score_b = 0;
        self.current_team = Team::A;
        self.phase = Phase::InProgress;
        info!(
            a_pieces = self.board.count(Team::A),
            b_pieces = self.board.count(Team::B),
            "Board reset"
        );

        self.emit(GameEvent::BoardReset);
        self.emit(GameEvent::TurnChanged(self.current_team));
        self.emit(GameEvent::ScoreChanged {
            score_a: 0,
            score_b: 0,
        });
    }

    /// Validates and applies a move for the current team.
    ///
    /// The move is accepted only if a generated legal move from `from` lands
    /// on `to`. Returns `false` without touching any state or emitting any
    /// event otherwise.
    #[instrument(skip(self), fields(team = %self.current_team))]
    pub fn try_apply_move(&mut self, from: Position, to: Position) -> bool {
        if self.phase != Phase::InProgress {
            debug!(phase = ?self.phase, "Move rejected: game not in progress");
            return false;
        }

        let Some(chosen) = self
            .valid_moves_from(from)
            .into_iter()
            .find(|m| m.to == to)
        else {
            debug!("Move rejected: no matching legal move");
            return false;
        };

        let mover = self.current_team;
        let piece = self.board.get(chosen.from).unwrap_or(PieceKind::Empty);
        let promoted = if chosen.to.row == mover.promotion_row(self.board.rows()) {
            piece.crowned()
        } else {
            piece
        };

        let placed = self
            .board
            .set(chosen.from, PieceKind::Empty)
            .and_then(|()| self.board.set(chosen.to, promoted));
        debug_assert!(placed.is_ok(), "generated move left the board: {placed:?}");
        if let Some(captured) = chosen.captured {
            let cleared = self.board.set(captured, PieceKind::Empty);
            debug_assert!(cleared.is_ok(), "captured cell outside the board: {cleared:?}");
            match mover {
                Team::A => self.score_a += 1,
                Team::B => self.score_b += 1,
            }
            self.emit(GameEvent::ScoreChanged {
                score_a: self.score_a,
                score_b: self.score_b,
            });
        }

        info!(%chosen, promoted = promoted != piece, "Move applied");
        self.emit(GameEvent::MoveApplied(chosen));

        match is_terminal(&self.board, mover) {
            Some(winner) => {
                info!(%winner, "Game over");
                self.phase = Phase::GameOver { winner };
                self.emit(GameEvent::GameOver { winner });
            }
            None => {
                self.current_team = mover.opponent();
                self.emit(GameEvent::TurnChanged(self.current_team));
            }
        }

        true
    }
}
