//! Wire protocol for Unolan.
//!
//! This crate defines what crosses the network between the host and its
//! participants:
//!
//! - **Types** ([`GameEvent`] and its four payloads, [`HandshakeReply`]):
//!   the records that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those records are
//!   turned into single lines of text and back.
//! - **Errors** ([`ProtocolError`]): what can go wrong while doing so.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (lines of text) and the game
//! (state transitions). It doesn't know about sockets or turn order; it
//! only knows how to serialize and deserialize events.
//!
//! ```text
//! Transport (lines) → Protocol (GameEvent) → Game (state machine)
//! ```
//!
//! The handshake is the one exception to "everything is JSON": the first
//! line a participant sends is its raw nickname, and the host answers
//! with a bare word (`WELCOME`, `INVALID_NICKNAME`, `SESSION_FULL`).

// ---------------------------------------------------------------------------
// Module declarations
// ---------------------------------------------------------------------------

mod codec;
mod error;
mod types;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{EndGame, GameEvent, HandshakeReply, StartGame, Step, TakeCard};

/// Re-exported so users of the protocol don't need a direct dependency
/// on the card crate to build events.
pub use unolan_cards::Card;
