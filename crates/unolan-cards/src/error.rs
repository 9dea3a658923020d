//! Error types for the card layer.

use crate::Card;

/// Errors that can occur while handling cards and decks.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CardError {
    /// A draw was attempted on an exhausted deck. There is no reshuffle
    /// from the discard pile, so this ends the operation that asked.
    #[error("deck is empty")]
    EmptyDeck,

    /// A specific card was requested but is not in the pile.
    ///
    /// Raised when a replicated deck is asked to mirror a draw the host
    /// made. It means the two copies have drifted apart; callers log it
    /// and carry on.
    #[error("card {0} not found")]
    CardNotFound(Card),

    /// A card record broke the color/value/action rules.
    #[error("invalid card: {0}")]
    InvalidCard(String),
}
