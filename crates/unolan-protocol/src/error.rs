//! Error types for the protocol layer.
//!
//! Each crate in Unolan defines its own error enum. When you see a
//! `ProtocolError`, the problem is in turning records into events (or
//! back), not in networking or game rules.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into a record).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning a record into a Rust type).
    ///
    /// Common causes: malformed JSON, an unknown `command`, missing
    /// required fields, or a card that breaks the color rules.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The record decoded but describes an impossible state, e.g. a
    /// `start_game` whose current player is not in the turn queue.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// The host answered the handshake with something unrecognized.
    #[error("unexpected handshake reply: {0:?}")]
    Handshake(String),
}
