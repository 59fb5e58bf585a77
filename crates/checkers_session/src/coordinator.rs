//! Authoritative host-side session coordination.
//!
//! The coordinator owns the canonical [`Game`] and the seat table. It is the
//! only writer of either, and processes one input at a time: a connect, a
//! disconnect or a peer message is fully handled (validated, applied and
//! broadcast) before the next one is looked at.

use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::transport::{ConnectionId, HOST_CONNECTION, Outbox};
use crate::wire::{ControlSignal, HostMessage, MoveIntent, PeerMessage, SeatAssignment, Snapshot};
use checkers_core::{
    BoardState, Game, GameEvent, Seat, SeatMode, StandardLayout, Team, resolve_acting_seat,
};
use std::collections::{BTreeMap, BTreeSet};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

/// What happened to a move intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentOutcome {
    /// The move was legal and applied.
    Applied,
    /// The match is paused, not started, or already over.
    NotAccepting,
    /// The sender holds no seat.
    Unseated,
    /// The sender's team is not the team to move.
    WrongTeam {
        /// Sender's seat.
        seat: Seat,
        /// Team to move.
        current: Team,
    },
    /// No legal move matched the intent.
    Illegal,
}

/// Host-side coordinator for one session.
#[derive(Debug)]
pub struct SessionCoordinator<O: Outbox> {
    mode: SeatMode,
    layout: StandardLayout,
    game: Game,
    events: mpsc::UnboundedReceiver<GameEvent>,
    seats: BTreeMap<ConnectionId, Seat>,
    spectators: BTreeSet<ConnectionId>,
    is_started: bool,
    acting_seat: Option<Seat>,
    outbox: O,
}

impl<O: Outbox> SessionCoordinator<O> {
    /// Creates the session, seats the host on seat 1 and resets the board.
    ///
    /// The match does not start until the join quorum is met.
    ///
    /// # Errors
    ///
    /// Fails if the configured board dimensions are not positive.
    #[instrument(skip(config, outbox), fields(rows = config.rows(), cols = config.cols(), mode = ?config.seat_mode()))]
    pub fn new(config: &SessionConfig, outbox: O) -> Result<Self, SessionError> {
        let board = BoardState::new(*config.rows(), *config.cols())?;
        let mut game = Game::new(board);
        let events = game.subscribe();

        let mut coordinator = Self {
            mode: *config.seat_mode(),
            layout: config.layout(),
            game,
            events,
            seats: BTreeMap::from([(HOST_CONNECTION, Seat::One)]),
            spectators: BTreeSet::new(),
            is_started: false,
            acting_seat: None,
            outbox,
        };
        info!("Session created, host holds seat 1");

        coordinator
            .outbox
            .send(HOST_CONNECTION, HostMessage::SeatAssignment(SeatAssignment::seated(Seat::One)));
        coordinator.game.reset(&coordinator.layout);
        coordinator.pump_events();
        Ok(coordinator)
    }

    /// The canonical game.
    pub fn game(&self) -> &Game {
        &self.game
    }

    /// True while moves are accepted.
    pub fn is_started(&self) -> bool {
        self.is_started
    }

    /// Seat mode of this session.
    pub fn mode(&self) -> SeatMode {
        self.mode
    }

    /// Seat resolved to act for the current team.
    pub fn acting_seat(&self) -> Seat {
        self.acting_seat.unwrap_or(Seat::One)
    }

    /// Seat held by a connection.
    pub fn seat_of(&self, id: ConnectionId) -> Option<Seat> {
        self.seats.get(&id).copied()
    }

    /// True if the connection is a spectator.
    pub fn is_spectator(&self, id: ConnectionId) -> bool {
        self.spectators.contains(&id)
    }

    /// Occupied seats in clockwise order.
    pub fn occupied_seats(&self) -> Vec<Seat> {
        let mut seats: Vec<_> = self.seats.values().copied().collect();
        seats.sort();
        seats
    }

    /// The outbox.
    pub fn outbox(&self) -> &O {
        &self.outbox
    }

    /// Mutable access to the outbox, for transport registration.
    pub fn outbox_mut(&mut self) -> &mut O {
        &mut self.outbox
    }

    /// Full state as sent to peers.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(
            self.game.board(),
            self.game.score_a(),
            self.game.score_b(),
            self.acting_seat(),
            self.game.is_over(),
            self.is_started,
        )
    }

    fn broadcast_snapshot(&mut self) {
        let snapshot = self.snapshot();
        self.outbox.broadcast(HostMessage::Snapshot(snapshot));
    }

    fn send_snapshot(&mut self, to: ConnectionId) {
        let snapshot = self.snapshot();
        self.outbox.send(to, HostMessage::Snapshot(snapshot));
    }

    fn quorum_met(&self) -> bool {
        let occupied = self.occupied_seats();
        match self.mode {
            SeatMode::Two => occupied.iter().any(|seat| seat.team() == Team::B),
            SeatMode::Four => self.mode.seats().iter().all(|seat| occupied.contains(seat)),
        }
    }

    fn resolve_acting(&mut self, team: Team) {
        let seat = resolve_acting_seat(team, self.acting_seat, &self.occupied_seats(), self.mode);
        self.acting_seat = Some(seat);
    }

    /// Points the acting seat at the game's current team if it does not already.
    fn sync_acting_seat(&mut self) {
        let team = self.game.current_team();
        if self.acting_seat.map(Seat::team) != Some(team) {
            self.resolve_acting(team);
        }
    }

    /// Drains game events, forwarding each as a control signal and a snapshot.
    ///
    /// Every snapshot carries an acting seat of the game's current team, even
    /// when the turn-changed event is still queued behind it.
    fn pump_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            match event {
                GameEvent::BoardReset => {
                    self.acting_seat = None;
                    self.outbox
                        .broadcast(HostMessage::Control(ControlSignal::BoardReset));
                }
                GameEvent::ScoreChanged { score_a, score_b } => {
                    self.outbox
                        .broadcast(HostMessage::Control(ControlSignal::ScoreChanged {
                            score_a: score_a as i32,
                            score_b: score_b as i32,
                        }));
                }
                GameEvent::GameOver { winner } => {
                    info!(%winner, "Match over");
                    self.outbox
                        .broadcast(HostMessage::Control(ControlSignal::MatchOver {
                            winning_team: winner,
                        }));
                }
                GameEvent::MoveApplied(_) | GameEvent::TurnChanged(_) => {}
            }
            self.sync_acting_seat();
            self.broadcast_snapshot();
        }
    }

    fn start_match(&mut self) {
        self.is_started = true;
        self.resolve_acting(self.game.current_team());
        info!(seats = ?self.occupied_seats(), "Match started");
        self.outbox
            .broadcast(HostMessage::Control(ControlSignal::MatchStarted));
        self.broadcast_snapshot();
    }

    /// Seats a newly connected peer, or makes it a spectator when seats are full.
    ///
    /// Returns the assigned seat, `None` for spectators.
    #[instrument(skip(self))]
    pub fn handle_connect(&mut self, id: ConnectionId) -> Option<Seat> {
        if id == HOST_CONNECTION {
            debug!("Host connection is always seated");
            return Some(Seat::One);
        }

        let existing = self.seat_of(id);
        let seat = existing.or_else(|| {
            if self.spectators.contains(&id) {
                return None;
            }
            let occupied = self.occupied_seats();
            self.mode
                .guest_seats()
                .iter()
                .copied()
                .find(|seat| !occupied.contains(seat))
        });

        match seat {
            Some(seat) => {
                self.seats.insert(id, seat);
                info!(%seat, team = %seat.team(), "Assigned seat");
                self.outbox
                    .send(id, HostMessage::SeatAssignment(SeatAssignment::seated(seat)));
            }
            None => {
                self.spectators.insert(id);
                info!("Seats full, joining as spectator");
                self.outbox
                    .send(id, HostMessage::SeatAssignment(SeatAssignment::spectator()));
            }
        }

        if self.is_started {
            debug!("Late joiner, re-sending match started");
            self.outbox
                .send(id, HostMessage::Control(ControlSignal::MatchStarted));
            self.send_snapshot(id);
        } else if self.quorum_met() {
            self.start_match();
        } else {
            self.send_snapshot(id);
        }

        seat
    }

    /// Frees the seat of a departed peer, pausing if team B is left empty.
    #[instrument(skip(self))]
    pub fn handle_disconnect(&mut self, id: ConnectionId) {
        if id == HOST_CONNECTION {
            warn!("Host connection lost; session teardown belongs to the transport");
            return;
        }

        if self.spectators.remove(&id) {
            info!("Spectator left");
            return;
        }

        let Some(seat) = self.seats.remove(&id) else {
            debug!("Unknown connection left");
            return;
        };
        info!(%seat, "Seat freed");

        let team_b_seated = self.seats.values().any(|s| s.team() == Team::B);
        if !team_b_seated {
            if self.is_started {
                info!("No team B player left, pausing match");
            }
            self.is_started = false;
            self.outbox
                .broadcast(HostMessage::Control(ControlSignal::WaitingForOpponent));
        } else if self.acting_seat == Some(seat) {
            self.resolve_acting(self.game.current_team());
        }
        self.broadcast_snapshot();
    }

    /// Routes one peer message.
    #[instrument(skip(self, message), fields(kind = message.kind()))]
    pub fn handle_message(&mut self, id: ConnectionId, message: PeerMessage) {
        match message {
            PeerMessage::MoveIntent(intent) => {
                self.handle_move_intent(id, intent);
            }
            PeerMessage::RequestSnapshot => self.send_snapshot(id),
            PeerMessage::RequestReturnToMenu => self.return_to_menu(),
        }
    }

    /// Authorizes a move intent against the current team and applies it.
    ///
    /// Rejections are silent towards the sender, except a team mismatch,
    /// which is answered with a corrective snapshot.
    #[instrument(skip(self), fields(from = %intent.origin(), to = %intent.target()))]
    pub fn handle_move_intent(&mut self, id: ConnectionId, intent: MoveIntent) -> IntentOutcome {
        if !self.is_started || self.game.is_over() {
            debug!(started = self.is_started, "Intent ignored: match not accepting moves");
            return IntentOutcome::NotAccepting;
        }

        let Some(seat) = self.seat_of(id) else {
            debug!("Intent ignored: sender has no seat");
            return IntentOutcome::Unseated;
        };

        let current = self.game.current_team();
        if seat.team() != current {
            warn!(%seat, team = %seat.team(), %current, "Intent from wrong team, potential desync");
            self.send_snapshot(id);
            return IntentOutcome::WrongTeam { seat, current };
        }

        if !self.game.try_apply_move(intent.origin(), intent.target()) {
            debug!(%seat, "Intent rejected by rules");
            return IntentOutcome::Illegal;
        }

        self.pump_events();
        IntentOutcome::Applied
    }

    /// Resets the board and starts immediately, skipping the join quorum.
    #[instrument(skip(self))]
    pub fn restart(&mut self) {
        info!("Host restarting match");
        self.game.reset(&self.layout);
        self.is_started = true;
        self.pump_events();
        self.resolve_acting(self.game.current_team());
        self.outbox
            .broadcast(HostMessage::Control(ControlSignal::MatchStarted));
        self.broadcast_snapshot();
    }

    /// Sends every participant back to the pre-match screen.
    #[instrument(skip(self))]
    pub fn return_to_menu(&mut self) {
        info!("Returning all participants to menu");
        self.is_started = false;
        self.outbox
            .broadcast(HostMessage::Control(ControlSignal::ReturnToMenu));
    }
}
