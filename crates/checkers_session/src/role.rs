//! Role-agnostic access for presentation code.
//!
//! A presentation layer reads the board and submits moves the same way
//! whether it runs on the host or on a peer. The host applies moves
//! directly; a peer only produces intents for the host.

use crate::coordinator::{IntentOutcome, SessionCoordinator};
use crate::mirror::RemoteMirror;
use crate::transport::{HOST_CONNECTION, Outbox};
use crate::wire::MoveIntent;
use checkers_core::{BoardState, Position, Team};

/// Result of submitting a move through a [`BoardSync`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// The move was applied to the authoritative board.
    Applied,
    /// The move was refused locally.
    Refused,
    /// An intent must be delivered to the host.
    Forward(MoveIntent),
}

/// Board access shared by host and peer roles.
pub trait BoardSync {
    /// Board as currently known to this role.
    fn board(&self) -> &BoardState;

    /// Team to move.
    fn current_team(&self) -> Team;

    /// Submits a move on behalf of the local participant.
    fn submit_move(&mut self, from: Position, to: Position) -> Submission;
}

impl<O: Outbox> BoardSync for SessionCoordinator<O> {
    fn board(&self) -> &BoardState {
        self.game().board()
    }

    fn current_team(&self) -> Team {
        self.game().current_team()
    }

    fn submit_move(&mut self, from: Position, to: Position) -> Submission {
        match self.handle_move_intent(HOST_CONNECTION, MoveIntent::between(from, to)) {
            IntentOutcome::Applied => Submission::Applied,
            _ => Submission::Refused,
        }
    }
}

impl BoardSync for RemoteMirror {
    fn board(&self) -> &BoardState {
        RemoteMirror::board(self)
    }

    fn current_team(&self) -> Team {
        RemoteMirror::current_team(self)
    }

    fn submit_move(&mut self, from: Position, to: Position) -> Submission {
        match self.intent(from, to) {
            Some(intent) => Submission::Forward(intent),
            None => Submission::Refused,
        }
    }
}
