//! Peer-side replica of the host's state.
//!
//! The mirror never runs game rules on its board. It replaces its local copy
//! wholesale from every snapshot, and turns local clicks into move intents
//! for the host to judge. Legal move generation is used only to highlight
//! targets for the selected piece.

use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::wire::{ControlSignal, HostMessage, MoveIntent, Snapshot};
use checkers_core::{BoardLayout, BoardState, Move, Position, Seat, Team, legal_moves, team_of};
use tracing::{debug, info, instrument, warn};

/// Presentation-relevant result of applying one host message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorUpdate {
    /// Seat assigned, `None` for spectators.
    SeatAssigned(Option<Seat>),
    /// Board and match state replaced.
    Snapshot,
    /// The match started.
    Started,
    /// The match is paused for lack of an opponent.
    Waiting,
    /// The match ended.
    MatchOver {
        /// Winning team.
        winner: Team,
        /// True if the local player is seated on the winning team.
        local_won: bool,
    },
    /// The board was reset.
    Reset,
    /// Scores changed.
    Score {
        /// Captures by team A.
        score_a: i32,
        /// Captures by team B.
        score_b: i32,
    },
    /// The session is over, go back to the menu.
    ReturnToMenu,
}

/// Local replica of a host session.
#[derive(Debug, Clone)]
pub struct RemoteMirror {
    board: BoardState,
    seat: Option<Seat>,
    is_spectator: bool,
    is_started: bool,
    is_over: bool,
    winner: Option<Team>,
    acting_seat: Seat,
    score_a: i32,
    score_b: i32,
    selected: Option<Position>,
    highlights: Vec<Move>,
}

impl RemoteMirror {
    /// Creates a mirror showing the configured starting layout.
    ///
    /// Until a seat assignment arrives the mirror is read-only.
    pub fn new(config: &SessionConfig) -> Result<Self, SessionError> {
        let mut board = BoardState::new(*config.rows(), *config.cols())?;
        config.layout().setup(&mut board);
        Ok(Self {
            board,
            seat: None,
            is_spectator: true,
            is_started: false,
            is_over: false,
            winner: None,
            acting_seat: Seat::One,
            score_a: 0,
            score_b: 0,
            selected: None,
            highlights: Vec::new(),
        })
    }

    /// Local board copy.
    pub fn board(&self) -> &BoardState {
        &self.board
    }

    /// Local seat, if seated.
    pub fn seat(&self) -> Option<Seat> {
        self.seat
    }

    /// Team of the local seat.
    pub fn local_team(&self) -> Option<Team> {
        self.seat.map(team_of)
    }

    /// True if the local participant may only watch.
    pub fn is_spectator(&self) -> bool {
        self.is_spectator
    }

    /// True while the host accepts moves.
    pub fn is_started(&self) -> bool {
        self.is_started
    }

    /// True once the game has a winner.
    pub fn is_over(&self) -> bool {
        self.is_over
    }

    /// Winner of the last finished game.
    pub fn winner(&self) -> Option<Team> {
        self.winner
    }

    /// Seat the host resolved to act.
    pub fn acting_seat(&self) -> Seat {
        self.acting_seat
    }

    /// Team to move, derived from the acting seat.
    pub fn current_team(&self) -> Team {
        team_of(self.acting_seat)
    }

    /// Captures by team A.
    pub fn score_a(&self) -> i32 {
        self.score_a
    }

    /// Captures by team B.
    pub fn score_b(&self) -> i32 {
        self.score_b
    }

    /// Currently selected piece.
    pub fn selected(&self) -> Option<Position> {
        self.selected
    }

    /// Legal moves of the selected piece.
    pub fn highlights(&self) -> &[Move] {
        &self.highlights
    }

    /// True if local input would currently be turned into intents.
    pub fn can_act(&self) -> bool {
        self.is_started
            && !self.is_over
            && !self.is_spectator
            && self.local_team() == Some(self.current_team())
    }

    fn clear_selection(&mut self) {
        self.selected = None;
        self.highlights.clear();
    }

    fn apply_snapshot(&mut self, snapshot: &Snapshot) -> Result<(), SessionError> {
        let board = snapshot.board()?;
        let acting_seat = snapshot.acting_seat().ok_or_else(|| {
            SessionError::new(format!(
                "Snapshot names invalid acting seat {}",
                snapshot.current_acting_seat
            ))
        })?;

        self.board = board;
        self.acting_seat = acting_seat;
        self.score_a = snapshot.score_a;
        self.score_b = snapshot.score_b;
        self.is_over = snapshot.is_over;
        self.is_started = snapshot.is_started;
        self.clear_selection();
        Ok(())
    }

    /// Applies one host message.
    ///
    /// # Errors
    ///
    /// Fails on a snapshot that does not describe a valid board. The mirror
    /// is left unchanged in that case.
    #[instrument(skip(self, message), fields(kind = message.kind()))]
    pub fn apply(&mut self, message: HostMessage) -> Result<MirrorUpdate, SessionError> {
        let update = match message {
            HostMessage::Snapshot(snapshot) => {
                self.apply_snapshot(&snapshot)?;
                debug!(acting = %self.acting_seat, started = self.is_started, "Snapshot applied");
                MirrorUpdate::Snapshot
            }
            HostMessage::SeatAssignment(assignment) => {
                self.is_spectator = assignment.is_spectator;
                self.seat = if assignment.is_spectator {
                    None
                } else {
                    let seat = Seat::from_number(assignment.seat);
                    if seat.is_none() {
                        warn!(seat = assignment.seat, "Invalid seat assigned, watching instead");
                        self.is_spectator = true;
                    }
                    seat
                };
                info!(seat = ?self.seat, spectator = self.is_spectator, "Seat assignment received");
                MirrorUpdate::SeatAssigned(self.seat)
            }
            HostMessage::Control(signal) => self.apply_control(signal),
        };
        Ok(update)
    }

    fn apply_control(&mut self, signal: ControlSignal) -> MirrorUpdate {
        match signal {
            ControlSignal::MatchStarted => {
                self.is_started = true;
                MirrorUpdate::Started
            }
            ControlSignal::WaitingForOpponent => {
                self.is_started = false;
                self.clear_selection();
                MirrorUpdate::Waiting
            }
            ControlSignal::MatchOver { winning_team } => {
                self.is_over = true;
                self.winner = Some(winning_team);
                self.clear_selection();
                let local_won = !self.is_spectator && self.local_team() == Some(winning_team);
                info!(winner = %winning_team, local_won, "Match over");
                MirrorUpdate::MatchOver {
                    winner: winning_team,
                    local_won,
                }
            }
            ControlSignal::BoardReset => {
                self.is_over = false;
                self.winner = None;
                self.score_a = 0;
                self.score_b = 0;
                self.acting_seat = Seat::One;
                self.clear_selection();
                MirrorUpdate::Reset
            }
            ControlSignal::ScoreChanged { score_a, score_b } => {
                self.score_a = score_a;
                self.score_b = score_b;
                MirrorUpdate::Score { score_a, score_b }
            }
            ControlSignal::ReturnToMenu => {
                self.is_started = false;
                self.seat = None;
                self.is_spectator = true;
                self.clear_selection();
                MirrorUpdate::ReturnToMenu
            }
        }
    }

    /// Handles a click on `pos`.
    ///
    /// The first click selects one of the local team's pieces and highlights
    /// its moves. Clicking the selection again clears it. Any other click
    /// produces an intent from the selection to `pos` for the host to
    /// validate. The local board is never changed here.
    #[instrument(skip(self))]
    pub fn click(&mut self, pos: Position) -> Option<MoveIntent> {
        if !self.can_act() {
            debug!("Input ignored: not this participant's turn");
            return None;
        }
        let team = self.local_team()?;

        match self.selected {
            None => {
                let piece = self.board.get(pos)?;
                if !piece.belongs_to(team) {
                    return None;
                }
                self.selected = Some(pos);
                self.highlights = legal_moves(&self.board, pos, team);
                debug!(targets = self.highlights.len(), "Piece selected");
                None
            }
            Some(selected) if selected == pos => {
                self.clear_selection();
                None
            }
            Some(selected) => {
                self.clear_selection();
                Some(MoveIntent::between(selected, pos))
            }
        }
    }

    /// Builds an intent directly, when the local participant may act.
    pub fn intent(&self, from: Position, to: Position) -> Option<MoveIntent> {
        self.can_act().then(|| MoveIntent::between(from, to))
    }
}
