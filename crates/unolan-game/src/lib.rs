//! Game state machine for Unolan.
//!
//! The same rules run on the host (authoritative) and on every
//! participant (replicated from the host's events):
//!
//! ```text
//! WaitingForPlayers ──start──→ InProgress ──empty hand / abort──→ Finished
//! ```
//!
//! # Key types
//!
//! - [`GameState`]: deck, hands, turn queue, top card, winner
//! - [`TurnQueue`]: cyclic seating with direction, skip and reverse
//! - [`Replica`]: a participant's confirmed + predicted copies
//! - [`StateChange`]: the notification tags the presentation consumes
//! - [`TableView`]: what one player may see of the table
//!
//! Nothing in this crate performs I/O or logs. The host and participant
//! actors that drive it do both.

mod change;
mod config;
mod error;
mod replica;
mod state;
mod turn;
mod view;

pub use change::StateChange;
pub use config::{GameConfig, GamePhase};
pub use error::GameError;
pub use replica::{Reconcile, Replica};
pub use state::GameState;
pub use turn::TurnQueue;
pub use view::{OpponentView, TableView};
