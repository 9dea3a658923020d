//! Card and deck model for Unolan.
//!
//! This is the leaf of the workspace: plain values with no I/O and no
//! async. Everything above it (protocol, game state, networking) moves
//! [`Card`]s around; only this crate knows how a deck is built and which
//! card may follow which.
//!
//! # Key types
//!
//! - [`Card`]: an immutable card value (`color`, `face`), compared by value
//! - [`Deck`]: an ordered pile whose top is the end of the vector
//! - [`CardError`]: `EmptyDeck`, `CardNotFound`, `InvalidCard`

mod card;
mod deck;
mod error;

pub use card::{Card, CardAction, Color, Face};
pub use deck::{Deck, DECK_SIZE};
pub use error::CardError;
