//! Pure checkers game logic.
//!
//! # Architecture
//!
//! - **Board**: bounds-checked `rows x cols` grid ([`BoardState`])
//! - **Rules**: stateless move generation and terminal detection ([`rules`])
//! - **Layout**: starting positions ([`StandardLayout`])
//! - **Game**: turn order, scores, promotion and typed events ([`Game`])
//! - **Seats**: seat/team mapping and acting-seat rotation ([`seats`])
//!
//! # Example
//!
//! ```
//! use checkers_core::{BoardState, Game, Position, StandardLayout, Team};
//!
//! let board = BoardState::new(6, 6).unwrap();
//! let mut game = Game::new(board);
//! game.reset(&StandardLayout::new(2));
//!
//! assert!(game.try_apply_move(Position::new(1, 0), Position::new(2, 1)));
//! assert_eq!(game.current_team(), Team::B);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod board;
mod game;
mod layout;
pub mod rules;
pub mod seats;
mod types;

pub use board::{BoardError, BoardState};
pub use game::{Game, GameEvent, Phase};
pub use layout::{BoardLayout, StandardLayout};
pub use rules::{is_terminal, legal_moves, team_has_any_move};
pub use seats::{Seat, SeatMode, next_seat_clockwise, resolve_acting_seat, team_of};
pub use types::{Move, PieceKind, Position, Team};
