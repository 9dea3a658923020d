//! Card values and the "may this card follow that one" rule.
//!
//! On the wire a card is a flat record:
//!
//! ```text
//! { "color": "red", "value": "draw_two", "action": "draw_two" }
//! { "color": "blue", "value": "7", "action": null }
//! ```
//!
//! In Rust the `value`/`action` pair collapses into a single [`Face`],
//! so a card can never claim a `skip` value with a `reverse` action.
//! The conversion goes through a private `CardRecord` that serde reads
//! and writes; anything that breaks the rules is rejected at decode time.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::CardError;

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// The color of a card.
///
/// `Black` is the color wild cards carry in the deck and in hands. Once
/// played, a wild card takes the color the player picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    Red,
    Blue,
    Green,
    Yellow,
    Black,
}

impl Color {
    /// The four colors a player can choose for a wild card.
    pub const PLAYABLE: [Color; 4] =
        [Color::Red, Color::Blue, Color::Green, Color::Yellow];

    /// Returns the lowercase wire name of the color.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Black => "black",
        }
    }

    /// Parses a wire name. Case-insensitive.
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "red" => Some(Self::Red),
            "blue" => Some(Self::Blue),
            "green" => Some(Self::Green),
            "yellow" => Some(Self::Yellow),
            "black" => Some(Self::Black),
            _ => None,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// CardAction
// ---------------------------------------------------------------------------

/// The side effect a card has when played.
///
/// Number cards have no action. The names double as state-change tags,
/// so a presentation layer that receives `"draw_two"` knows exactly which
/// card caused it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardAction {
    Skip,
    Reverse,
    DrawTwo,
    DrawFour,
    Wild,
}

impl CardAction {
    /// Returns the snake_case wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Skip => "skip",
            Self::Reverse => "reverse",
            Self::DrawTwo => "draw_two",
            Self::DrawFour => "draw_four",
            Self::Wild => "wild",
        }
    }

    /// `true` for the colorless actions (`wild`, `draw_four`). Any card
    /// may be played on top of these.
    pub fn is_wild(self) -> bool {
        matches!(self, Self::Wild | Self::DrawFour)
    }

    /// How many cards the next player is forced to draw.
    pub fn penalty(self) -> usize {
        match self {
            Self::DrawTwo => 2,
            Self::DrawFour => 4,
            _ => 0,
        }
    }
}

impl fmt::Display for CardAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Face
// ---------------------------------------------------------------------------

/// What is printed on a card: a number 0-9 or one of the action faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Face {
    Number(u8),
    Skip,
    Reverse,
    DrawTwo,
    Wild,
    DrawFour,
}

impl Face {
    /// The action this face triggers, or `None` for numbers.
    pub fn action(self) -> Option<CardAction> {
        match self {
            Self::Number(_) => None,
            Self::Skip => Some(CardAction::Skip),
            Self::Reverse => Some(CardAction::Reverse),
            Self::DrawTwo => Some(CardAction::DrawTwo),
            Self::Wild => Some(CardAction::Wild),
            Self::DrawFour => Some(CardAction::DrawFour),
        }
    }

    /// `true` for `Wild` and `DrawFour`.
    pub fn is_wild(self) -> bool {
        matches!(self, Self::Wild | Self::DrawFour)
    }

    /// The wire `value` string: `"0"`..`"9"` or the action name.
    pub fn value(self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            other => other
                .action()
                .map(CardAction::as_str)
                .unwrap_or_default()
                .to_string(),
        }
    }

    /// Parses a wire `value` string.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "skip" => Some(Self::Skip),
            "reverse" => Some(Self::Reverse),
            "draw_two" => Some(Self::DrawTwo),
            "wild" => Some(Self::Wild),
            "draw_four" => Some(Self::DrawFour),
            digits => match digits.parse::<u8>() {
                Ok(n) if n <= 9 && digits.len() == 1 => Some(Self::Number(n)),
                _ => None,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Card
// ---------------------------------------------------------------------------

/// A single card. Immutable; equality is by value.
///
/// Two red sevens are equal, which is exactly what mirroring a draw
/// needs: the replica only has to remove *a* red seven from its deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "CardRecord", try_from = "CardRecord")]
pub struct Card {
    color: Color,
    face: Face,
}

impl Card {
    /// Creates a card, checking the color rules.
    ///
    /// Colored faces can't be black and numbers stop at 9. Wild faces
    /// may carry any color: black in the deck, the chosen color once
    /// played.
    pub fn new(color: Color, face: Face) -> Result<Self, CardError> {
        if let Face::Number(n) = face {
            if n > 9 {
                return Err(CardError::InvalidCard(format!(
                    "number {n} out of range"
                )));
            }
        }
        if color == Color::Black && !face.is_wild() {
            return Err(CardError::InvalidCard(format!(
                "{} cannot be black",
                face.value()
            )));
        }
        Ok(Self { color, face })
    }

    /// A number card. `n` must be 0-9.
    pub fn number(color: Color, n: u8) -> Self {
        debug_assert!(n <= 9 && color != Color::Black);
        Self {
            color,
            face: Face::Number(n),
        }
    }

    /// A black wild card as it comes out of the deck.
    pub fn wild() -> Self {
        Self {
            color: Color::Black,
            face: Face::Wild,
        }
    }

    /// A black draw-four card as it comes out of the deck.
    pub fn draw_four() -> Self {
        Self {
            color: Color::Black,
            face: Face::DrawFour,
        }
    }

    /// A colored skip, reverse or draw-two card.
    pub fn colored(color: Color, face: Face) -> Self {
        debug_assert!(!face.is_wild() && color != Color::Black);
        Self { color, face }
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn face(&self) -> Face {
        self.face
    }

    pub fn action(&self) -> Option<CardAction> {
        self.face.action()
    }

    /// `true` for wild and draw-four cards, whatever color they carry.
    pub fn is_wild(&self) -> bool {
        self.face.is_wild()
    }

    /// `true` for plain 0-9 cards.
    pub fn is_number(&self) -> bool {
        matches!(self.face, Face::Number(_))
    }

    /// Returns this wild card with the chosen color.
    ///
    /// Colored cards are returned unchanged: only wild cards have a
    /// color to choose.
    pub fn with_color(self, color: Color) -> Self {
        if self.is_wild() {
            Self { color, ..self }
        } else {
            self
        }
    }

    /// Returns the card as it sits in a deck or hand.
    ///
    /// A played wild card carries the chosen color; in the hand it was
    /// black. Lookups in hands and decks go through this.
    pub fn as_dealt(self) -> Self {
        if self.is_wild() {
            Self {
                color: Color::Black,
                ..self
            }
        } else {
            self
        }
    }

    /// `true` if this wild card still needs a color before it can be played.
    pub fn needs_color(&self) -> bool {
        self.is_wild() && self.color == Color::Black
    }

    /// Returns `true` if this card may be played on `top`.
    ///
    /// Rules, in order:
    /// 1. anything may follow a wild or draw-four;
    /// 2. a black (wild) card may always be played;
    /// 3. otherwise the colors or the values must match.
    pub fn can_play_on(&self, top: &Card) -> bool {
        if top.action().is_some_and(CardAction::is_wild) {
            return true;
        }
        self.color == Color::Black
            || self.color == top.color
            || self.face == top.face
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.color, self.face.value())
    }
}

// ---------------------------------------------------------------------------
// Wire record
// ---------------------------------------------------------------------------

/// The flat shape a card has on the wire.
#[derive(Serialize, Deserialize)]
struct CardRecord {
    color: Color,
    value: String,
    #[serde(default)]
    action: Option<CardAction>,
}

impl From<Card> for CardRecord {
    fn from(card: Card) -> Self {
        Self {
            color: card.color,
            value: card.face.value(),
            action: card.action(),
        }
    }
}

impl TryFrom<CardRecord> for Card {
    type Error = CardError;

    fn try_from(record: CardRecord) -> Result<Self, Self::Error> {
        let face = Face::parse(&record.value).ok_or_else(|| {
            CardError::InvalidCard(format!("unknown value {:?}", record.value))
        })?;
        if record.action != face.action() {
            return Err(CardError::InvalidCard(format!(
                "value {:?} does not match action {:?}",
                record.value, record.action
            )));
        }
        Card::new(record.color, face)
    }
}
