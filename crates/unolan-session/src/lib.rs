//! Participant tracking for Unolan.
//!
//! This crate answers "who is at the table?":
//!
//! 1. **Identity**: [`Nickname`] validates the name a participant sends
//!    as its first line.
//! 2. **Registry**: [`ParticipantRegistry`] maps nicknames to whatever
//!    handle the host uses to reach that participant, enforcing
//!    uniqueness and capacity.
//! 3. **Nickname list**: [`load_nicknames`] reads the suggestions a
//!    front end offers, with built-in defaults.
//!
//! # How it fits in the stack
//!
//! ```text
//! Host table actor (above)  ← owns one registry, mutates it serially
//!     ↕
//! Session layer (this crate)  ← nickname rules, seat accounting
//! ```
//!
//! The registry is a plain map, not a concurrent one. It is owned by a
//! single task and reached through that task's command channel.

mod config;
mod error;
mod nickname;
mod registry;

pub use config::{DEFAULT_NICKNAMES, NICKNAMES_PATH, SessionConfig, load_nicknames};
pub use error::SessionError;
pub use nickname::{MAX_NICKNAME_LEN, Nickname};
pub use registry::ParticipantRegistry;
