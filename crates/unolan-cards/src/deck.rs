//! The draw pile.
//!
//! A [`Deck`] is an ordered `Vec<Card>` whose *top* is the last element,
//! so drawing is a `pop`. The order matters: the host ships the whole
//! pile to every participant at game start, and each copy must draw the
//! same card the host would.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::{Card, CardError, Color, Face};

/// Number of cards in a freshly built deck.
pub const DECK_SIZE: usize = 108;

/// An ordered pile of cards. The top of the pile is the end of the vector.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// Builds the 108 cards in generation order, unshuffled.
    ///
    /// Per color: one `0`, two of each `1`..`9`, two each of skip,
    /// reverse and draw-two. Then four wild and four draw-four.
    pub fn standard() -> Self {
        let mut cards = Vec::with_capacity(DECK_SIZE);

        for color in Color::PLAYABLE {
            cards.push(Card::number(color, 0));
            for n in 1..=9 {
                cards.push(Card::number(color, n));
                cards.push(Card::number(color, n));
            }
            for face in [Face::Skip, Face::Reverse, Face::DrawTwo] {
                cards.push(Card::colored(color, face));
                cards.push(Card::colored(color, face));
            }
        }

        for _ in 0..4 {
            cards.push(Card::wild());
            cards.push(Card::draw_four());
        }

        Self { cards }
    }

    /// Builds a standard deck and shuffles it with `rng`.
    pub fn shuffled<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut deck = Self::standard();
        deck.shuffle(rng);
        deck
    }

    /// Builds a standard deck shuffled with the thread-local RNG.
    pub fn new() -> Self {
        Self::shuffled(&mut rand::rng())
    }

    /// Wraps an existing pile, e.g. the snapshot received at game start.
    pub fn from_cards(cards: Vec<Card>) -> Self {
        Self { cards }
    }

    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    /// Removes and returns the top card.
    ///
    /// # Errors
    /// [`CardError::EmptyDeck`] if no cards remain.
    pub fn draw(&mut self) -> Result<Card, CardError> {
        self.cards.pop().ok_or(CardError::EmptyDeck)
    }

    /// Removes the card equal to `card`, searching from the top.
    ///
    /// Wild cards are matched in their dealt (black) form, so a played
    /// wild with a chosen color still finds its deck entry.
    ///
    /// # Errors
    /// [`CardError::CardNotFound`] if no equal card is in the pile.
    pub fn remove_specific(&mut self, card: &Card) -> Result<Card, CardError> {
        let wanted = card.as_dealt();
        let index = self
            .cards
            .iter()
            .rposition(|c| *c == wanted)
            .ok_or(CardError::CardNotFound(*card))?;
        Ok(self.cards.remove(index))
    }

    /// Removes the opening discard: the first number card from the top.
    ///
    /// Falls back to an ordinary [`draw`](Self::draw) if the pile holds no
    /// number card at all, so the opening card is never an action or
    /// wild card in a real deck.
    pub fn pick_start_card(&mut self) -> Result<Card, CardError> {
        match self.cards.iter().rposition(Card::is_number) {
            Some(index) => Ok(self.cards.remove(index)),
            None => self.draw(),
        }
    }

    /// Deals `hand_size` cards to each of `players` hands, one card per
    /// player per round.
    ///
    /// # Errors
    /// [`CardError::EmptyDeck`] if the pile runs out mid-deal. Cards
    /// already dealt are not returned to the pile.
    pub fn deal(
        &mut self,
        players: usize,
        hand_size: usize,
    ) -> Result<Vec<Vec<Card>>, CardError> {
        let mut hands = vec![Vec::with_capacity(hand_size); players];
        for _ in 0..hand_size {
            for hand in hands.iter_mut() {
                hand.push(self.draw()?);
            }
        }
        Ok(hands)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// The pile, bottom first.
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// The card [`draw`](Self::draw) would return next.
    pub fn peek(&self) -> Option<&Card> {
        self.cards.last()
    }
}
