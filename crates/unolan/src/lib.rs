//! # Unolan
//!
//! LAN session coordinator for a turn-based card game with one host and
//! up to three participants.
//!
//! The host owns the authoritative game and broadcasts every transition;
//! participants find it by a short session code, take a seat under a
//! nickname, and replay the host's events on a local copy. Both roles
//! expose the same [`GameCommands`] surface and the same stream of
//! [`StateChange`](unolan_game::StateChange) notifications.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use unolan::prelude::*;
//!
//! # async fn demo() -> Result<(), UnolanError> {
//! // On the host:
//! let mut host = start_session(2, "Ann").await?;
//! println!("tell your friend the code {}", host.code);
//!
//! // On the participant's machine:
//! let guest = join_session(host.code, "Bob", &BeaconConfig::default()).await?;
//!
//! // Back on the host, once the table is full:
//! while let Some(change) = host.changes.recv().await {
//!     if change == StateChange::Lobby {
//!         host.commands.start_game().await?;
//!         break;
//!     }
//! }
//! # drop(guest);
//! # Ok(())
//! # }
//! ```

#![allow(async_fn_in_trait)]

mod commands;
mod error;
mod handler;
mod host;
mod participant;
mod table;

pub use commands::{GameCommands, Session, StateChanges};
pub use error::UnolanError;
pub use host::{DEFAULT_BIND, Host, HostBuilder, HostHandle, start_session};
pub use participant::{ParticipantHandle, join_at, join_session};

pub use unolan_beacon as beacon;
pub use unolan_cards as cards;
pub use unolan_game as game;
pub use unolan_protocol as protocol;
pub use unolan_session as session;
pub use unolan_transport as transport;

pub mod prelude {
    pub use crate::{
        GameCommands, Host, HostBuilder, HostHandle, ParticipantHandle, Session,
        StateChanges, UnolanError, join_at, join_session, start_session,
    };
    pub use unolan_beacon::{BeaconConfig, SessionCode};
    pub use unolan_cards::{Card, CardAction, Color, Face};
    pub use unolan_game::{GameConfig, GamePhase, OpponentView, StateChange, TableView};
    pub use unolan_session::{NICKNAMES_PATH, SessionError, load_nicknames};
}
