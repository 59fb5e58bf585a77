//! Game rules for checkers.
//!
//! Pure functions over [`crate::BoardState`] and a team. Rules know nothing
//! about seats, turns or scores.

pub mod moves;
pub mod terminal;

pub use moves::{legal_moves, team_has_any_move};
pub use terminal::is_terminal;
