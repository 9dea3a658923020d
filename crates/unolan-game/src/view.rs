//! The read model a presentation layer renders.

use serde::Serialize;
use unolan_cards::{Card, Color};

use crate::GamePhase;

/// Another player as seen from across the table: a name and a card count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpponentView {
    pub nickname: String,
    pub cards: usize,
}

/// One player's view of the table after the latest transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableView {
    pub me: String,
    pub hand: Vec<Card>,
    /// Everyone else, in seating order after `me`.
    pub opponents: Vec<OpponentView>,
    pub top_card: Option<Card>,
    pub current_player: Option<String>,
    /// Seating order rotated so `me` comes first.
    pub seating: Vec<String>,
    pub deck_size: usize,
    pub phase: GamePhase,
    pub winner: Option<String>,
    /// The player whose departure aborted the game.
    pub departed: Option<String>,
}

impl TableView {
    pub fn is_my_turn(&self) -> bool {
        self.phase.is_active() && self.current_player.as_deref() == Some(self.me.as_str())
    }

    /// The color of the top card, or the color chosen for a wild on top.
    pub fn active_color(&self) -> Option<Color> {
        self.top_card
            .map(|c| c.color())
            .filter(|color| *color != Color::Black)
    }

    /// Fills the seating from the players waiting in the lobby, `me`
    /// first. Opponents hold no cards until the deal.
    pub fn with_lobby(mut self, seated: &[String]) -> Self {
        let split = seated.iter().position(|n| *n == self.me).unwrap_or(0);
        self.seating = seated[split..].iter().chain(&seated[..split]).cloned().collect();
        self.opponents = self
            .seating
            .iter()
            .filter(|name| **name != self.me)
            .map(|name| OpponentView {
                nickname: name.clone(),
                cards: 0,
            })
            .collect();
        self
    }

    /// Indices into `hand` of the cards that may follow the top card.
    pub fn playable(&self) -> Vec<usize> {
        self.hand
            .iter()
            .enumerate()
            .filter(|(_, card)| self.top_card.is_none_or(|top| card.can_play_on(&top)))
            .map(|(i, _)| i)
            .collect()
    }
}
