//! Networked session layer for team checkers.
//!
//! # Architecture
//!
//! - **Coordinator**: the authoritative host, owner of the game and seat table
//! - **Mirror**: a peer's read-only replica, turning input into move intents
//! - **Wire**: snapshot, seat assignment, control and intent messages
//! - **Transport**: [`Outbox`] seam plus a TCP JSON-lines adapter ([`net`])
//! - **Discovery**: LAN host announcement over UDP
//! - **Progress**: persisted coin balance
//!
//! # Example
//!
//! ```
//! use checkers_session::{
//!     ChannelOutbox, HOST_CONNECTION, IntentOutcome, MoveIntent, SessionConfig,
//!     SessionCoordinator,
//! };
//!
//! let mut coordinator =
//!     SessionCoordinator::new(&SessionConfig::default(), ChannelOutbox::new()).unwrap();
//! coordinator.handle_connect(1);
//! assert!(coordinator.is_started());
//!
//! let outcome = coordinator.handle_move_intent(HOST_CONNECTION, MoveIntent::new(1, 0, 2, 1));
//! assert_eq!(outcome, IntentOutcome::Applied);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod cli;
pub mod console;
mod config;
mod coordinator;
mod discovery;
mod error;
mod mirror;
pub mod net;
mod progress;
mod role;
mod transport;
mod wire;

pub use config::SessionConfig;
pub use coordinator::{IntentOutcome, SessionCoordinator};
pub use discovery::{DISCOVERY_MESSAGE, HostFinder, UdpDiscovery};
pub use error::{ConfigError, SessionError};
pub use mirror::{MirrorUpdate, RemoteMirror};
pub use progress::{COINS_KEY, JsonFileStore, MemoryStore, ProgressStore, Wallet};
pub use role::{BoardSync, Submission};
pub use transport::{ChannelOutbox, ConnectionId, HOST_CONNECTION, Outbox};
pub use wire::{
    ControlSignal, HostMessage, MoveIntent, PeerMessage, SeatAssignment, Snapshot, decode_line,
    encode_line,
};
