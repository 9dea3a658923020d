//! Codec trait and implementations for turning events into records.
//!
//! A "codec" (coder/decoder) converts between Rust types and the text
//! records the transport carries. Records are single lines, so a codec
//! must never emit a raw line break.
//!
//! Currently we provide [`JsonCodec`]: self-describing, stable field
//! names, and unknown fields are ignored on decode, so an older peer can
//! read a newer peer's events.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// A codec that can encode Rust types to single-line records and back.
///
/// `Send + Sync + 'static` because one codec instance is shared by every
/// connection task on the host.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into one line of text.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError>;

    /// Deserializes one line of text back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the record is malformed,
    /// incomplete, or doesn't match the expected type.
    fn decode<T: DeserializeOwned>(&self, record: &str) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses compact JSON (via `serde_json`).
///
/// Compact output escapes every newline inside strings, so each encoded
/// value is exactly one line.
///
/// ## Example
///
/// ```rust
/// use unolan_protocol::{Codec, EndGame, GameEvent, JsonCodec};
///
/// let codec = JsonCodec;
/// let event = GameEvent::EndGame(EndGame { winner: "Ann".into() });
///
/// let record = codec.encode(&event).unwrap();
/// assert_eq!(record, r#"{"command":"end_game","winner":"Ann"}"#);
///
/// let decoded: GameEvent = codec.decode(&record).unwrap();
/// assert_eq!(event, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError> {
        serde_json::to_string(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, record: &str) -> Result<T, ProtocolError> {
        serde_json::from_str(record).map_err(ProtocolError::Decode)
    }
}
