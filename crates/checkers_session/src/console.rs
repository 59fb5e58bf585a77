//! Line-oriented console presentation.

use crate::coordinator::SessionCoordinator;
use crate::mirror::{MirrorUpdate, RemoteMirror};
use crate::role::{BoardSync, Submission};
use crate::transport::Outbox;
use checkers_core::Position;
use derive_more::{Display, Error};
use std::str::FromStr;

/// A command typed at the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// Click a cell: select, deselect or target.
    Click(Position),
    /// Move directly from one cell to another.
    Move(Position, Position),
    /// Restart the match (host only).
    Restart,
    /// Send everyone back to the menu.
    Menu,
    /// Print the board again.
    Show,
    /// Print the command list.
    Help,
    /// Leave.
    Quit,
}

/// Unparseable console input.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display("Unrecognized command '{}', type 'help'", input)]
pub struct ParseCommandError {
    /// Offending input.
    #[error(not(source))]
    pub input: String,
}

/// Help text listing console commands.
pub const HELP: &str = "\
commands:
  <row> <col>                 click a cell (select, deselect or target)
  <row> <col> <row> <col>     move a piece
  show                        print the board
  restart                     restart the match (host)
  menu                        return everyone to the menu
  quit                        leave";

impl FromStr for ConsoleCommand {
    type Err = ParseCommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseCommandError {
            input: s.trim().to_string(),
        };
        let words: Vec<&str> = s.split_whitespace().collect();
        match words.as_slice() {
            ["restart"] => Ok(Self::Restart),
            ["menu"] => Ok(Self::Menu),
            ["show"] | [] => Ok(Self::Show),
            ["help"] | ["?"] => Ok(Self::Help),
            ["quit"] | ["exit"] => Ok(Self::Quit),
            numbers => {
                let values = numbers
                    .iter()
                    .map(|w| w.parse::<i32>())
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|_| err())?;
                match values.as_slice() {
                    [r, c] => Ok(Self::Click(Position::new(*r, *c))),
                    [fr, fc, tr, tc] => {
                        Ok(Self::Move(Position::new(*fr, *fc), Position::new(*tr, *tc)))
                    }
                    _ => Err(err()),
                }
            }
        }
    }
}

/// Routes a host-side click: the mirror tracks the selection, the
/// coordinator judges the resulting move.
///
/// Returns `None` when the click only changed the selection.
pub fn host_click<O: Outbox>(
    coordinator: &mut SessionCoordinator<O>,
    mirror: &mut RemoteMirror,
    pos: Position,
) -> Option<Submission> {
    let intent = mirror.click(pos)?;
    Some(coordinator.submit_move(intent.origin(), intent.target()))
}

/// Message for a submission the player should hear about.
pub fn feedback(submission: Submission) -> Option<&'static str> {
    match submission {
        Submission::Refused => Some("Move not accepted"),
        Submission::Applied | Submission::Forward(_) => None,
    }
}

/// Renders the mirror's board and match status.
pub fn render(mirror: &RemoteMirror) -> String {
    let mut out = mirror.board().display();
    out.push_str(&format!(
        "\nScore A {} : {} B | {} to move ({})",
        mirror.score_a(),
        mirror.score_b(),
        mirror.current_team(),
        mirror.acting_seat()
    ));

    let you = match (mirror.seat(), mirror.is_spectator()) {
        (Some(seat), false) => format!("{} ({})", seat, seat.team()),
        _ => "spectating".to_string(),
    };
    out.push_str(&format!("\nYou: {}", you));

    if let Some(selected) = mirror.selected() {
        let targets: Vec<String> = mirror.highlights().iter().map(|m| m.to.to_string()).collect();
        out.push_str(&format!("\nSelected {} -> {}", selected, targets.join(" ")));
    }

    if !mirror.is_started() {
        out.push_str("\nWaiting for players...");
    } else if let Some(winner) = mirror.winner().filter(|_| mirror.is_over()) {
        out.push_str(&format!("\n{} wins!", winner));
    } else if mirror.can_act() {
        out.push_str("\nYour turn.");
    }
    out
}

/// One-line notice for updates worth announcing, if any.
pub fn notice(update: &MirrorUpdate) -> Option<String> {
    match update {
        MirrorUpdate::SeatAssigned(Some(seat)) => {
            Some(format!("Seated at {} ({})", seat, seat.team()))
        }
        MirrorUpdate::SeatAssigned(None) => Some("Seats are full, watching as spectator".into()),
        MirrorUpdate::Started => Some("Match started".into()),
        MirrorUpdate::Waiting => Some("Waiting for opponent".into()),
        MirrorUpdate::MatchOver { winner, local_won } => Some(if *local_won {
            format!("{} wins, you won!", winner)
        } else {
            format!("{} wins", winner)
        }),
        MirrorUpdate::ReturnToMenu => Some("Session ended, back to menu".into()),
        MirrorUpdate::Snapshot | MirrorUpdate::Reset | MirrorUpdate::Score { .. } => None,
    }
}
