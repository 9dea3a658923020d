//! Protocol types for Unolan's wire format.
//!
//! Every record after the handshake is a [`GameEvent`]: a flat JSON
//! object whose `command` field names the kind.
//!
//! ```text
//! {"command":"step","player":"Ann","top_card":{...},"next_player":"Bob"}
//! ```
//!
//! Field names are part of the protocol and must stay stable. Unknown
//! fields are ignored when decoding.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use unolan_cards::Card;

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Handshake
// ---------------------------------------------------------------------------

/// The host's one-word answer to a participant's nickname.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeReply {
    /// The nickname is registered; game events follow.
    Welcome,
    /// The nickname is taken (or is the host's own, or malformed).
    InvalidNickname,
    /// Every seat is taken or the game already started.
    SessionFull,
}

impl HandshakeReply {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Welcome => "WELCOME",
            Self::InvalidNickname => "INVALID_NICKNAME",
            Self::SessionFull => "SESSION_FULL",
        }
    }

    /// Parses the host's reply line.
    ///
    /// # Errors
    /// [`ProtocolError::Handshake`] for anything other than the three
    /// known words.
    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        match line.trim() {
            "WELCOME" => Ok(Self::Welcome),
            "INVALID_NICKNAME" => Ok(Self::InvalidNickname),
            "SESSION_FULL" => Ok(Self::SessionFull),
            other => Err(ProtocolError::Handshake(other.to_string())),
        }
    }
}

impl fmt::Display for HandshakeReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Event payloads
// ---------------------------------------------------------------------------

/// Sent once by the host when the game begins.
///
/// Carries the *whole* authoritative state, including every other
/// player's hand, so each participant can mirror later draws without
/// asking the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartGame {
    pub player_count: usize,
    /// Seating order. Play starts at `current_player` and moves forward.
    pub turn_queue: Vec<String>,
    pub current_player: String,
    /// The opening discard. Always a number card.
    pub top_card: Card,
    /// The draw pile after dealing, bottom first.
    pub full_deck_snapshot: Vec<Card>,
    /// Players in join order (host first).
    pub nicknames: Vec<String>,
    pub per_player_hands: BTreeMap<String, Vec<Card>>,
}

impl StartGame {
    /// Checks that the snapshot describes a consistent table.
    ///
    /// # Errors
    /// [`ProtocolError::InvalidMessage`] naming the first inconsistency.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        let invalid = |msg: String| Err(ProtocolError::InvalidMessage(msg));

        if self.player_count != self.turn_queue.len() {
            return invalid(format!(
                "player_count {} but {} queued",
                self.player_count,
                self.turn_queue.len()
            ));
        }
        if !self.turn_queue.contains(&self.current_player) {
            return invalid(format!(
                "current player {:?} not in turn queue",
                self.current_player
            ));
        }
        for name in &self.turn_queue {
            if !self.per_player_hands.contains_key(name) {
                return invalid(format!("no hand for {name:?}"));
            }
        }
        if self.per_player_hands.len() != self.turn_queue.len() {
            return invalid("hands for players outside the queue".into());
        }
        Ok(())
    }
}

/// Sent after every successful play.
///
/// If `top_card` has an action, receivers apply it too (reverse flips
/// direction; draw-two/draw-four penalties arrive as separate
/// `take_card` events right after).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub player: String,
    /// The card played. A wild card carries the chosen color.
    pub top_card: Card,
    pub next_player: String,
}

/// Sent after a card leaves the deck for a player's hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TakeCard {
    pub player: String,
    pub card: Card,
}

/// Sent when a player's hand reaches zero cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndGame {
    pub winner: String,
}

// ---------------------------------------------------------------------------
// GameEvent
// ---------------------------------------------------------------------------

/// Every record exchanged after the handshake.
///
/// `#[serde(tag = "command")]` produces internally tagged JSON: the
/// variant name becomes a `"command"` field next to the payload's own
/// fields, which keeps each record a single flat object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum GameEvent {
    StartGame(StartGame),
    Step(Step),
    TakeCard(TakeCard),
    EndGame(EndGame),
}

impl GameEvent {
    /// The `command` value this event is tagged with.
    pub fn command(&self) -> &'static str {
        match self {
            Self::StartGame(_) => "start_game",
            Self::Step(_) => "step",
            Self::TakeCard(_) => "take_card",
            Self::EndGame(_) => "end_game",
        }
    }

    /// The player who acted, for events that have one.
    pub fn actor(&self) -> Option<&str> {
        match self {
            Self::Step(step) => Some(&step.player),
            Self::TakeCard(take) => Some(&take.player),
            Self::StartGame(_) | Self::EndGame(_) => None,
        }
    }
}

impl From<StartGame> for GameEvent {
    fn from(v: StartGame) -> Self {
        Self::StartGame(v)
    }
}

impl From<Step> for GameEvent {
    fn from(v: Step) -> Self {
        Self::Step(v)
    }
}

impl From<TakeCard> for GameEvent {
    fn from(v: TakeCard) -> Self {
        Self::TakeCard(v)
    }
}

impl From<EndGame> for GameEvent {
    fn from(v: EndGame) -> Self {
        Self::EndGame(v)
    }
}

// =========================================================================
// Tests
// =========================================================================
