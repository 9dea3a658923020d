//! Error types for the session layer.

/// Errors that can occur while admitting or tracking participants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// The nickname is malformed, already registered, or equal to the
    /// host's. The participant must retry with another name.
    #[error("invalid nickname: {0:?}")]
    InvalidNickname(String),

    /// Every remote seat is taken, or the game has already started.
    #[error("session is full")]
    SessionFull,

    /// No participant is registered under this nickname.
    #[error("no participant named {0:?}")]
    NotFound(String),

    /// Capacity outside the supported table sizes.
    #[error("capacity {0} is outside 2..=4")]
    InvalidCapacity(usize),
}
