//! Error types for the game layer.

use unolan_cards::{Card, CardError};
use unolan_protocol::ProtocolError;

/// Errors that can occur while driving the game state machine.
///
/// Rule violations (`NotYourTurn`, `CardNotInHand`, `IllegalPlay`,
/// `ColorNotChosen`) leave the state untouched. Callers at the command
/// boundary refuse the move and carry on.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// `EmptyDeck` on a draw, or `CardNotFound` while mirroring one.
    #[error(transparent)]
    Card(#[from] CardError),

    /// A `start_game` snapshot that doesn't describe a consistent table.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("game is not in progress")]
    NotInProgress,

    #[error("game has already started")]
    AlreadyStarted,

    #[error("it is {current}'s turn, not {player}'s")]
    NotYourTurn { player: String, current: String },

    #[error("{0} is not in the player's hand")]
    CardNotInHand(Card),

    #[error("{card} cannot be played on {top}")]
    IllegalPlay { card: Card, top: Card },

    /// A wild card was played while still black.
    #[error("a color must be chosen before playing {0}")]
    ColorNotChosen(Card),

    #[error("unknown player {0:?}")]
    UnknownPlayer(String),

    #[error("{0} players is outside the supported range")]
    InvalidPlayerCount(usize),
}
