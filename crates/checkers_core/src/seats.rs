//! Seat to team mapping and acting-seat rotation.
//!
//! Seats are physical slots, teams are rule-level sides. These helpers sit on
//! top of the team-level turn and never feed back into the rules.

use crate::types::Team;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// One of up to four physical seats, numbered clockwise.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::EnumIter,
    derive_more::Display,
)]
pub enum Seat {
    /// Seat 1, always held by the host.
    #[display("Seat 1")]
    One,
    /// Seat 2.
    #[display("Seat 2")]
    Two,
    /// Seat 3, four-seat mode only.
    #[display("Seat 3")]
    Three,
    /// Seat 4, four-seat mode only.
    #[display("Seat 4")]
    Four,
}

impl Seat {
    /// Seat number 1-4.
    pub fn number(self) -> i32 {
        match self {
            Seat::One => 1,
            Seat::Two => 2,
            Seat::Three => 3,
            Seat::Four => 4,
        }
    }

    /// Parses a seat number, `None` outside 1-4.
    pub fn from_number(number: i32) -> Option<Self> {
        match number {
            1 => Some(Seat::One),
            2 => Some(Seat::Two),
            3 => Some(Seat::Three),
            4 => Some(Seat::Four),
            _ => None,
        }
    }

    /// Team this seat plays for: 1 and 3 are A, 2 and 4 are B.
    pub fn team(self) -> Team {
        match self {
            Seat::One | Seat::Three => Team::A,
            Seat::Two | Seat::Four => Team::B,
        }
    }
}

/// How many seats a match is played with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeatMode {
    /// Seats 1 and 2, one player per team.
    #[default]
    Two,
    /// Seats 1 to 4, two players per team.
    Four,
}

impl SeatMode {
    /// Number of active seats.
    pub fn seat_count(self) -> usize {
        match self {
            SeatMode::Two => 2,
            SeatMode::Four => 4,
        }
    }

    /// Seats active in this mode, in clockwise order.
    pub fn seats(self) -> &'static [Seat] {
        match self {
            SeatMode::Two => &[Seat::One, Seat::Two],
            SeatMode::Four => &[Seat::One, Seat::Two, Seat::Three, Seat::Four],
        }
    }

    /// Seats a joining guest may take. Seat 1 is reserved for the host.
    pub fn guest_seats(self) -> &'static [Seat] {
        &self.seats()[1..]
    }
}

/// Team of a seat.
pub fn team_of(seat: Seat) -> Team {
    seat.team()
}

/// Next seat clockwise: 1→2→3→4→1 in four-seat mode, 1↔2 otherwise.
pub fn next_seat_clockwise(seat: Seat, mode: SeatMode) -> Seat {
    match (mode, seat) {
        (SeatMode::Two, Seat::One) => Seat::Two,
        (SeatMode::Two, _) => Seat::One,
        (SeatMode::Four, Seat::One) => Seat::Two,
        (SeatMode::Four, Seat::Two) => Seat::Three,
        (SeatMode::Four, Seat::Three) => Seat::Four,
        (SeatMode::Four, Seat::Four) => Seat::One,
    }
}

/// Picks which occupied seat acts for `team` next.
///
/// Walks clockwise from `previous` (seat 1 when unset or not active in
/// `mode`), checking at most four seats starting with the start seat itself,
/// and returns the first occupied seat of `team`. Falls back to any occupied
/// seat of `team`, then to seat 1.
#[instrument(skip(occupied))]
pub fn resolve_acting_seat(
    team: Team,
    previous: Option<Seat>,
    occupied: &[Seat],
    mode: SeatMode,
) -> Seat {
    let start = previous
        .filter(|seat| mode.seats().contains(seat))
        .unwrap_or(Seat::One);

    let mut seat = start;
    for _ in 0..4 {
        if seat.team() == team && occupied.contains(&seat) {
            debug!(%seat, %team, "Resolved acting seat");
            return seat;
        }
        seat = next_seat_clockwise(seat, mode);
    }

    let fallback = occupied
        .iter()
        .copied()
        .filter(|seat| seat.team() == team)
        .min()
        .unwrap_or(Seat::One);
    debug!(%fallback, %team, "Acting seat fell back");
    fallback
}
