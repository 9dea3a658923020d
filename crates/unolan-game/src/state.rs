//! The game state machine.
//!
//! One [`GameState`] type serves both roles:
//!
//! - The **host** calls [`start`](GameState::start),
//!   [`play`](GameState::play) and [`draw`](GameState::draw). These check
//!   the rules, mutate, and return the events to broadcast.
//! - A **participant** feeds every received event to
//!   [`apply`](GameState::apply). That re-derives the host's transition
//!   from the event fields alone, with no randomness and no rule checks.
//!
//! Because every copy starts from the same `start_game` snapshot and
//! applies the same events in the same order, all copies converge.

use std::collections::BTreeMap;

use rand::Rng;
use rand::seq::SliceRandom;
use unolan_cards::{Card, CardAction, CardError, Deck};
use unolan_protocol::{EndGame, GameEvent, StartGame, Step, TakeCard};

use crate::{GameConfig, GameError, GamePhase, OpponentView, TableView, TurnQueue};

/// Deck, hands, turn order, top card and outcome of one game.
#[derive(Debug, Clone)]
pub struct GameState {
    config: GameConfig,
    phase: GamePhase,
    deck: Deck,
    /// Every player's hand. Wild cards are held in their dealt (black) form.
    hands: BTreeMap<String, Vec<Card>>,
    /// Players in join order.
    nicknames: Vec<String>,
    queue: Option<TurnQueue>,
    top: Option<Card>,
    winner: Option<String>,
    /// Set when the game was aborted because this player left.
    departed: Option<String>,
}

impl GameState {
    /// An empty table waiting for players.
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            phase: GamePhase::WaitingForPlayers,
            deck: Deck::default(),
            hands: BTreeMap::new(),
            nicknames: Vec::new(),
            queue: None,
            top: None,
            winner: None,
            departed: None,
        }
    }

    // -----------------------------------------------------------------------
    // Host: authoritative transitions
    // -----------------------------------------------------------------------

    /// Shuffles a fresh deck, deals to `nicknames`, turns up a number card
    /// and picks a random seating order.
    ///
    /// Returns the snapshot to broadcast as `start_game`.
    ///
    /// # Errors
    /// - [`GameError::AlreadyStarted`] unless waiting for players.
    /// - [`GameError::InvalidPlayerCount`] outside the configured range.
    pub fn start<R: Rng + ?Sized>(
        &mut self,
        nicknames: &[String],
        rng: &mut R,
    ) -> Result<StartGame, GameError> {
        if !self.phase.can_transition_to(GamePhase::InProgress) {
            return Err(GameError::AlreadyStarted);
        }
        if !self.config.accepts(nicknames.len()) {
            return Err(GameError::InvalidPlayerCount(nicknames.len()));
        }

        let mut deck = Deck::shuffled(rng);
        let dealt = deck.deal(nicknames.len(), self.config.hand_size)?;
        let top = deck.pick_start_card()?;

        let mut order = nicknames.to_vec();
        order.shuffle(rng);

        self.hands = nicknames.iter().cloned().zip(dealt).collect();
        self.nicknames = nicknames.to_vec();
        self.deck = deck;
        self.top = Some(top);
        self.queue = Some(TurnQueue::new(order));
        self.phase = GamePhase::InProgress;

        Ok(self.snapshot())
    }

    /// Plays `card` for `player` and returns every event the play causes,
    /// in broadcast order:
    ///
    /// 1. the `step`,
    /// 2. one `take_card` per penalty card for a draw-two or draw-four,
    /// 3. `end_game` if the play emptied the player's hand.
    ///
    /// Penalty cards go to the new current player. If the deck runs dry
    /// mid-penalty the rest of the penalty is dropped. A winning play
    /// carries no penalty.
    ///
    /// # Errors
    /// Any rule violation from [`validate_play`](Self::validate_play).
    /// The state is unchanged on error.
    pub fn play(&mut self, player: &str, card: Card) -> Result<Vec<GameEvent>, GameError> {
        let step = self.play_step(player, card)?;
        let mut events = vec![GameEvent::Step(step)];

        if let Some(winner) = &self.winner {
            events.push(GameEvent::EndGame(EndGame {
                winner: winner.clone(),
            }));
            return Ok(events);
        }

        let penalty = card.action().map_or(0, CardAction::penalty);
        let victim = self.current_player().map(str::to_string);
        if let Some(victim) = victim {
            for _ in 0..penalty {
                match self.deal_to(&victim) {
                    Ok(take) => events.push(GameEvent::TakeCard(take)),
                    Err(_) => break,
                }
            }
        }

        Ok(events)
    }

    /// Validates and applies a play *without* penalty draws or
    /// `end_game`, returning only the `step`.
    ///
    /// This is the half of [`play`](Self::play) a participant may predict
    /// locally; the host settles the rest.
    pub fn play_step(&mut self, player: &str, card: Card) -> Result<Step, GameError> {
        self.validate_play(player, &card)?;
        self.resolve_play(player, card)?;
        Ok(Step {
            player: player.to_string(),
            top_card: card,
            next_player: self.current_player().unwrap_or_default().to_string(),
        })
    }

    /// Checks that `player` may play `card` now.
    ///
    /// # Errors
    /// - [`GameError::NotInProgress`] outside `InProgress`.
    /// - [`GameError::NotYourTurn`] if someone else is current.
    /// - [`GameError::CardNotInHand`] if the player doesn't hold it.
    /// - [`GameError::ColorNotChosen`] for a wild still black.
    /// - [`GameError::IllegalPlay`] if it can't follow the top card.
    pub fn validate_play(&self, player: &str, card: &Card) -> Result<(), GameError> {
        self.ensure_turn(player)?;

        let hand = self.hand_of(player)?;
        if !hand.contains(&card.as_dealt()) {
            return Err(GameError::CardNotInHand(*card));
        }
        if card.needs_color() {
            return Err(GameError::ColorNotChosen(*card));
        }
        // Legality is judged on the card as held: a wild is black in hand.
        if let Some(top) = self.top {
            if !card.as_dealt().can_play_on(&top) {
                return Err(GameError::IllegalPlay { card: *card, top });
            }
        }
        Ok(())
    }

    /// Draws the top card of the deck into `player`'s hand. Drawing does
    /// not end the turn.
    ///
    /// # Errors
    /// [`GameError::NotYourTurn`] or [`CardError::EmptyDeck`].
    pub fn draw(&mut self, player: &str) -> Result<TakeCard, GameError> {
        self.ensure_turn(player)?;
        self.deal_to(player)
    }

    /// Moves a specific card from the deck into `player`'s hand, after
    /// [`validate_take`](Self::validate_take) accepted it.
    pub fn draw_specific(&mut self, take: &TakeCard) -> Result<TakeCard, GameError> {
        self.validate_take(take)?;
        let card = self.deck.remove_specific(&take.card)?;
        self.hand_mut(&take.player)?.push(card);
        Ok(TakeCard {
            player: take.player.clone(),
            card,
        })
    }

    /// Checks a participant's reported draw against the host's deck: the
    /// player must be current and the card must still be in the deck.
    pub fn validate_take(&self, take: &TakeCard) -> Result<(), GameError> {
        self.ensure_turn(&take.player)?;
        if !self.deck.cards().contains(&take.card.as_dealt()) {
            return Err(CardError::CardNotFound(take.card).into());
        }
        Ok(())
    }

    /// Ends the game abnormally because `departed` left (`None` when the
    /// host went away). No winner.
    pub fn abort(&mut self, departed: Option<&str>) {
        self.phase = GamePhase::Finished;
        self.departed = departed.map(str::to_string);
    }

    // -----------------------------------------------------------------------
    // Participant: replicated transitions
    // -----------------------------------------------------------------------

    /// Rebuilds the whole table from a `start_game` snapshot.
    ///
    /// # Errors
    /// [`GameError::Protocol`] if the snapshot is inconsistent.
    pub fn from_start(start: &StartGame, config: GameConfig) -> Result<Self, GameError> {
        start.validate()?;
        let queue = TurnQueue::starting_at(start.turn_queue.clone(), &start.current_player)
            .ok_or_else(|| GameError::UnknownPlayer(start.current_player.clone()))?;

        Ok(Self {
            config,
            phase: GamePhase::InProgress,
            deck: Deck::from_cards(start.full_deck_snapshot.clone()),
            hands: start.per_player_hands.clone(),
            nicknames: start.nicknames.clone(),
            queue: Some(queue),
            top: Some(start.top_card),
            winner: None,
            departed: None,
        })
    }

    /// Applies one event received from the host.
    ///
    /// A `take_card` whose card is missing from the local deck still lands
    /// in the player's hand; the [`CardError::CardNotFound`] is returned so
    /// the caller can report the drift.
    pub fn apply(&mut self, event: &GameEvent) -> Result<(), GameError> {
        match event {
            GameEvent::StartGame(start) => {
                *self = Self::from_start(start, self.config.clone())?;
                Ok(())
            }
            GameEvent::Step(step) => self.apply_step(step),
            GameEvent::TakeCard(take) => self.apply_take_card(take),
            GameEvent::EndGame(end) => {
                self.apply_end_game(end);
                Ok(())
            }
        }
    }

    /// Mirrors a play. The host's `next_player` wins over the local
    /// computation.
    pub fn apply_step(&mut self, step: &Step) -> Result<(), GameError> {
        if !self.phase.is_active() {
            return Err(GameError::NotInProgress);
        }
        let resolved = self.resolve_play(&step.player, step.top_card);
        if self.phase.is_active() {
            if let Some(queue) = self.queue.as_mut() {
                queue.set_current(&step.next_player);
            }
        }
        resolved
    }

    pub fn apply_take_card(&mut self, take: &TakeCard) -> Result<(), GameError> {
        self.hand_mut(&take.player)?.push(take.card.as_dealt());
        self.deck.remove_specific(&take.card)?;
        Ok(())
    }

    pub fn apply_end_game(&mut self, end: &EndGame) {
        self.phase = GamePhase::Finished;
        self.winner = Some(end.winner.clone());
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// `None` before the game starts.
    pub fn current_player(&self) -> Option<&str> {
        self.queue.as_ref().map(TurnQueue::current)
    }

    pub fn queue(&self) -> Option<&TurnQueue> {
        self.queue.as_ref()
    }

    pub fn top_card(&self) -> Option<Card> {
        self.top
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn hand(&self, player: &str) -> Option<&[Card]> {
        self.hands.get(player).map(Vec::as_slice)
    }

    pub fn hands(&self) -> &BTreeMap<String, Vec<Card>> {
        &self.hands
    }

    pub fn nicknames(&self) -> &[String] {
        &self.nicknames
    }

    pub fn winner(&self) -> Option<&str> {
        self.winner.as_deref()
    }

    pub fn departed(&self) -> Option<&str> {
        self.departed.as_deref()
    }

    /// The full table as a `start_game` payload.
    pub fn snapshot(&self) -> StartGame {
        let (turn_queue, current_player) = match &self.queue {
            Some(q) => (q.order().to_vec(), q.current().to_string()),
            None => (Vec::new(), String::new()),
        };
        StartGame {
            player_count: turn_queue.len(),
            turn_queue,
            current_player,
            top_card: self.top.unwrap_or_else(Card::wild),
            full_deck_snapshot: self.deck.cards().to_vec(),
            nicknames: self.nicknames.clone(),
            per_player_hands: self.hands.clone(),
        }
    }

    /// What `me` is allowed to see: their own hand, card counts for
    /// everyone else.
    pub fn view_for(&self, me: &str) -> TableView {
        let seating = match &self.queue {
            Some(q) => q.rotated_from(me),
            None => self.nicknames.clone(),
        };
        let opponents = seating
            .iter()
            .filter(|name| name.as_str() != me)
            .map(|name| OpponentView {
                nickname: name.clone(),
                cards: self.hands.get(name).map_or(0, Vec::len),
            })
            .collect();

        TableView {
            me: me.to_string(),
            hand: self.hands.get(me).cloned().unwrap_or_default(),
            opponents,
            top_card: self.top,
            current_player: self.current_player().map(str::to_string),
            seating,
            deck_size: self.deck.len(),
            phase: self.phase,
            winner: self.winner.clone(),
            departed: self.departed.clone(),
        }
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// Removes the card from the hand, puts it on top, moves the turn,
    /// and checks for a win. Shared by host and replica so both derive
    /// the same transition.
    fn resolve_play(&mut self, player: &str, card: Card) -> Result<(), GameError> {
        let hand = self.hand_mut(player)?;
        let removed = match hand.iter().position(|c| *c == card.as_dealt()) {
            Some(index) => {
                hand.remove(index);
                Ok(())
            }
            None => Err(GameError::CardNotInHand(card)),
        };
        let emptied = hand.is_empty();

        self.top = Some(card);

        if let Some(queue) = self.queue.as_mut() {
            match card.action() {
                Some(CardAction::Reverse) => queue.reverse(),
                Some(CardAction::Skip) => queue.skip(),
                _ => queue.advance(),
            }
        }

        if emptied {
            self.phase = GamePhase::Finished;
            self.winner = Some(player.to_string());
        }
        removed
    }

    fn deal_to(&mut self, player: &str) -> Result<TakeCard, GameError> {
        if !self.hands.contains_key(player) {
            return Err(GameError::UnknownPlayer(player.to_string()));
        }
        let card = self.deck.draw()?;
        self.hand_mut(player)?.push(card);
        Ok(TakeCard {
            player: player.to_string(),
            card,
        })
    }

    fn ensure_turn(&self, player: &str) -> Result<(), GameError> {
        if !self.phase.is_active() {
            return Err(GameError::NotInProgress);
        }
        let current = self.current_player().unwrap_or_default();
        if current != player {
            return Err(GameError::NotYourTurn {
                player: player.to_string(),
                current: current.to_string(),
            });
        }
        Ok(())
    }

    fn hand_of(&self, player: &str) -> Result<&Vec<Card>, GameError> {
        self.hands
            .get(player)
            .ok_or_else(|| GameError::UnknownPlayer(player.to_string()))
    }

    fn hand_mut(&mut self, player: &str) -> Result<&mut Vec<Card>, GameError> {
        self.hands
            .get_mut(player)
            .ok_or_else(|| GameError::UnknownPlayer(player.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use unolan_cards::{Color, DECK_SIZE, Face};

    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    /// A hand-built table: `queue` order, first player current.
    fn table(queue: &[&str], hands: &[(&str, Vec<Card>)], top: Card, deck: Vec<Card>) -> GameState {
        let start = StartGame {
            player_count: queue.len(),
            turn_queue: names(queue),
            current_player: queue[0].to_string(),
            top_card: top,
            full_deck_snapshot: deck,
            nicknames: names(queue),
            per_player_hands: hands
                .iter()
                .map(|(n, h)| (n.to_string(), h.clone()))
                .collect(),
        };
        GameState::from_start(&start, GameConfig::default()).unwrap()
    }

    fn red(n: u8) -> Card {
        Card::number(Color::Red, n)
    }

    fn blue(n: u8) -> Card {
        Card::number(Color::Blue, n)
    }

    fn abc(top: Card) -> GameState {
        table(
            &["A", "B", "C"],
            &[
                ("A", vec![red(1), Card::colored(Color::Red, Face::Skip), Card::colored(Color::Red, Face::Reverse), blue(9)]),
                ("B", vec![red(2), blue(2)]),
                ("C", vec![red(3), blue(3)]),
            ],
            top,
            vec![blue(5); 10],
        )
    }

    // =====================================================================
    // start
    // =====================================================================

    #[test]
    fn test_start_seeded_two_players_deals_seven_each() {
        let mut state = GameState::new(GameConfig::default());
        let mut rng = StdRng::seed_from_u64(2024);
        let start = state.start(&names(&["Ann", "Bob"]), &mut rng).unwrap();

        assert_eq!(state.phase(), GamePhase::InProgress);
        assert_eq!(start.per_player_hands["Ann"].len(), 7);
        assert_eq!(start.per_player_hands["Bob"].len(), 7);
        assert!(start.top_card.is_number());
        assert!(["Ann", "Bob"].contains(&start.current_player.as_str()));
        assert_eq!(start.full_deck_snapshot.len(), DECK_SIZE - 14 - 1);
        assert_eq!(start.nicknames, ["Ann", "Bob"]);
        assert!(start.validate().is_ok());
    }

    #[test]
    fn test_start_same_seed_same_snapshot() {
        let players = names(&["Ann", "Bob", "Cid"]);
        let a = GameState::new(GameConfig::default())
            .start(&players, &mut StdRng::seed_from_u64(9))
            .unwrap();
        let b = GameState::new(GameConfig::default())
            .start(&players, &mut StdRng::seed_from_u64(9))
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_start_twice_returns_already_started() {
        let mut state = GameState::new(GameConfig::default());
        let mut rng = StdRng::seed_from_u64(1);
        state.start(&names(&["Ann", "Bob"]), &mut rng).unwrap();
        assert!(matches!(
            state.start(&names(&["Ann", "Bob"]), &mut rng),
            Err(GameError::AlreadyStarted)
        ));
    }

    #[test]
    fn test_start_one_player_returns_invalid_count() {
        let mut state = GameState::new(GameConfig::default());
        let result = state.start(&names(&["Ann"]), &mut StdRng::seed_from_u64(1));
        assert!(matches!(result, Err(GameError::InvalidPlayerCount(1))));
        assert_eq!(state.phase(), GamePhase::WaitingForPlayers);
    }

    // =====================================================================
    // Turn advancement
    // =====================================================================

    #[test]
    fn test_play_plain_card_advances_once() {
        let mut state = abc(red(7));
        let events = state.play("A", red(1)).unwrap();

        assert_eq!(state.current_player(), Some("B"));
        assert_eq!(
            events,
            vec![GameEvent::Step(Step {
                player: "A".into(),
                top_card: red(1),
                next_player: "B".into(),
            })]
        );
    }

    #[test]
    fn test_play_skip_passes_next_player() {
        let mut state = abc(red(7));
        state.play("A", Card::colored(Color::Red, Face::Skip)).unwrap();
        assert_eq!(state.current_player(), Some("C"));
    }

    #[test]
    fn test_play_reverse_three_players_goes_backwards() {
        let mut state = abc(red(7));
        state.play("A", Card::colored(Color::Red, Face::Reverse)).unwrap();
        assert_eq!(state.current_player(), Some("C"));

        state.play("C", red(3)).unwrap();
        assert_eq!(state.current_player(), Some("B"));
        state.play("B", red(2)).unwrap();
        assert_eq!(state.current_player(), Some("A"));
    }

    #[test]
    fn test_play_reverse_two_players_same_player_again() {
        let reverse = Card::colored(Color::Green, Face::Reverse);
        let mut state = table(
            &["Ann", "Bob"],
            &[("Ann", vec![reverse, red(1)]), ("Bob", vec![red(2)])],
            Card::number(Color::Green, 4),
            vec![blue(1); 5],
        );
        let events = state.play("Ann", reverse).unwrap();

        assert_eq!(state.current_player(), Some("Ann"));
        assert!(matches!(&events[0], GameEvent::Step(s) if s.next_player == "Ann"));
    }

    // =====================================================================
    // Rule checks
    // =====================================================================

    #[test]
    fn test_scenario_ann_plays_then_bob_illegal_is_rejected() {
        let mut state = table(
            &["Ann", "Bob"],
            &[
                ("Ann", vec![red(3), blue(8)]),
                ("Bob", vec![blue(7), Card::number(Color::Green, 1)]),
            ],
            red(5),
            vec![blue(1); 5],
        );

        let events = state.play("Ann", red(3)).unwrap();
        assert!(matches!(&events[0], GameEvent::Step(s) if s.next_player == "Bob"));

        let before = state.view_for("Bob");
        let result = state.play("Bob", blue(7));
        assert!(matches!(result, Err(GameError::IllegalPlay { .. })));
        assert_eq!(state.view_for("Bob"), before);
        assert_eq!(state.current_player(), Some("Bob"));
    }

    #[test]
    fn test_play_out_of_turn_returns_not_your_turn() {
        let mut state = abc(red(7));
        assert!(matches!(
            state.play("B", red(2)),
            Err(GameError::NotYourTurn { .. })
        ));
        assert_eq!(state.hand("B").unwrap().len(), 2);
    }

    #[test]
    fn test_play_card_not_held_returns_card_not_in_hand() {
        let mut state = abc(red(7));
        assert!(matches!(
            state.play("A", red(8)),
            Err(GameError::CardNotInHand(_))
        ));
    }

    #[test]
    fn test_play_black_wild_returns_color_not_chosen() {
        let mut state = table(
            &["Ann", "Bob"],
            &[("Ann", vec![Card::wild(), red(1)]), ("Bob", vec![red(2)])],
            blue(4),
            vec![blue(1); 5],
        );
        assert!(matches!(
            state.play("Ann", Card::wild()),
            Err(GameError::ColorNotChosen(_))
        ));

        let events = state.play("Ann", Card::wild().with_color(Color::Green)).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(state.top_card(), Some(Card::wild().with_color(Color::Green)));
        assert_eq!(state.hand("Ann").unwrap(), [red(1)]);
    }

    #[test]
    fn test_anything_follows_a_wild() {
        let mut state = table(
            &["Ann", "Bob"],
            &[("Ann", vec![blue(9), red(1)]), ("Bob", vec![red(2)])],
            Card::wild().with_color(Color::Yellow),
            vec![],
        );
        assert!(state.play("Ann", blue(9)).is_ok());
    }

    // =====================================================================
    // Penalties and winning
    // =====================================================================

    #[test]
    fn test_play_draw_two_deals_penalty_to_next_player() {
        let draw_two = Card::colored(Color::Red, Face::DrawTwo);
        let mut state = table(
            &["Ann", "Bob"],
            &[("Ann", vec![draw_two, red(1)]), ("Bob", vec![red(2)])],
            red(4),
            vec![blue(1), blue(2), blue(3)],
        );
        let events = state.play("Ann", draw_two).unwrap();

        assert_eq!(events.len(), 3);
        assert!(matches!(&events[0], GameEvent::Step(s) if s.next_player == "Bob"));
        assert_eq!(
            events[1],
            GameEvent::TakeCard(TakeCard { player: "Bob".into(), card: blue(3) })
        );
        assert_eq!(
            events[2],
            GameEvent::TakeCard(TakeCard { player: "Bob".into(), card: blue(2) })
        );
        assert_eq!(state.hand("Bob").unwrap().len(), 3);
        assert_eq!(state.deck().len(), 1);
        assert_eq!(state.current_player(), Some("Bob"));
    }

    #[test]
    fn test_play_draw_four_short_deck_deals_what_remains() {
        let mut state = table(
            &["Ann", "Bob"],
            &[("Ann", vec![Card::draw_four(), red(1)]), ("Bob", vec![red(2)])],
            red(4),
            vec![blue(1)],
        );
        let events = state
            .play("Ann", Card::draw_four().with_color(Color::Blue))
            .unwrap();

        assert_eq!(events.len(), 2);
        assert!(state.deck().is_empty());
        assert_eq!(state.hand("Bob").unwrap().len(), 2);
    }

    #[test]
    fn test_play_last_card_finishes_with_winner() {
        let skip = Card::colored(Color::Red, Face::Skip);
        let mut state = table(
            &["Ann", "Bob"],
            &[("Ann", vec![skip]), ("Bob", vec![red(2)])],
            red(4),
            vec![blue(1); 3],
        );
        let events = state.play("Ann", skip).unwrap();

        assert_eq!(state.phase(), GamePhase::Finished);
        assert_eq!(state.winner(), Some("Ann"));
        assert_eq!(
            events.last(),
            Some(&GameEvent::EndGame(EndGame { winner: "Ann".into() }))
        );
        assert!(matches!(state.play("Bob", red(2)), Err(GameError::NotInProgress)));
        assert!(matches!(state.draw("Bob"), Err(GameError::NotInProgress)));
    }

    #[test]
    fn test_winning_draw_two_carries_no_penalty() {
        let draw_two = Card::colored(Color::Red, Face::DrawTwo);
        let mut state = table(
            &["Ann", "Bob"],
            &[("Ann", vec![draw_two]), ("Bob", vec![red(2)])],
            red(4),
            vec![blue(1); 3],
        );
        let events = state.play("Ann", draw_two).unwrap();

        assert_eq!(events.len(), 2);
        assert!(matches!(events[1], GameEvent::EndGame(_)));
        assert_eq!(state.deck().len(), 3);
    }

    // =====================================================================
    // Drawing
    // =====================================================================

    #[test]
    fn test_draw_last_card_then_empty_deck() {
        let mut state = table(
            &["Ann", "Bob"],
            &[("Ann", vec![red(1)]), ("Bob", vec![red(2)])],
            red(4),
            vec![blue(6)],
        );

        let take = state.draw("Ann").unwrap();
        assert_eq!(take.card, blue(6));
        assert!(state.deck().is_empty());
        assert_eq!(state.current_player(), Some("Ann"));

        assert!(matches!(
            state.draw("Ann"),
            Err(GameError::Card(CardError::EmptyDeck))
        ));
        assert_eq!(state.hand("Ann").unwrap().len(), 2);
    }

    #[test]
    fn test_validate_take_rejects_card_missing_from_deck() {
        let state = table(
            &["Ann", "Bob"],
            &[("Ann", vec![red(1)]), ("Bob", vec![red(2)])],
            red(4),
            vec![blue(6)],
        );
        let bogus = TakeCard { player: "Ann".into(), card: red(9) };
        assert!(matches!(
            state.validate_take(&bogus),
            Err(GameError::Card(CardError::CardNotFound(_)))
        ));
        let late = TakeCard { player: "Bob".into(), card: blue(6) };
        assert!(matches!(state.validate_take(&late), Err(GameError::NotYourTurn { .. })));
    }

    #[test]
    fn test_draw_specific_moves_named_card() {
        let mut state = table(
            &["Ann", "Bob"],
            &[("Ann", vec![red(1)]), ("Bob", vec![red(2)])],
            red(4),
            vec![blue(6), blue(7)],
        );
        let take = TakeCard { player: "Ann".into(), card: blue(7) };
        assert_eq!(state.draw_specific(&take).unwrap(), take);
        assert_eq!(state.deck().cards(), [blue(6)]);
    }

    // =====================================================================
    // Replication
    // =====================================================================

    #[test]
    fn test_apply_mirrors_host_events() {
        let mut host = GameState::new(GameConfig::default());
        let start = host
            .start(&names(&["Ann", "Bob", "Cid"]), &mut StdRng::seed_from_u64(77))
            .unwrap();
        let mut mirror = GameState::new(GameConfig::default());
        mirror.apply(&GameEvent::StartGame(start)).unwrap();

        for _ in 0..5 {
            let current = host.current_player().unwrap().to_string();
            let take = host.draw(&current).unwrap();
            mirror.apply(&GameEvent::TakeCard(take)).unwrap();
        }

        assert_eq!(mirror.snapshot(), host.snapshot());
    }

    #[test]
    fn test_apply_take_card_missing_reports_but_still_adds() {
        let mut state = table(
            &["Ann", "Bob"],
            &[("Ann", vec![red(1)]), ("Bob", vec![red(2)])],
            red(4),
            vec![blue(6)],
        );
        let take = TakeCard { player: "Bob".into(), card: red(9) };
        assert!(matches!(
            state.apply(&GameEvent::TakeCard(take)),
            Err(GameError::Card(CardError::CardNotFound(_)))
        ));
        assert_eq!(state.hand("Bob").unwrap().len(), 2);
        assert_eq!(state.deck().len(), 1);
    }

    #[test]
    fn test_apply_step_uses_host_next_player() {
        let mut state = abc(red(7));
        let step = Step {
            player: "A".into(),
            top_card: red(1),
            next_player: "C".into(),
        };
        state.apply(&GameEvent::Step(step)).unwrap();
        assert_eq!(state.current_player(), Some("C"));
        assert_eq!(state.top_card(), Some(red(1)));
    }

    #[test]
    fn test_abort_finishes_without_winner() {
        let mut state = abc(red(7));
        state.abort(Some("B"));
        assert_eq!(state.phase(), GamePhase::Finished);
        assert_eq!(state.winner(), None);
        assert_eq!(state.departed(), Some("B"));
    }

    #[test]
    fn test_view_for_hides_other_hands() {
        let state = abc(red(7));
        let view = state.view_for("B");

        assert_eq!(view.hand, [red(2), blue(2)]);
        assert_eq!(view.seating, ["B", "C", "A"]);
        assert_eq!(view.opponents.len(), 2);
        assert_eq!(view.opponents[0].nickname, "C");
        assert_eq!(view.opponents[1].cards, 4);
        assert!(!view.is_my_turn());
        assert_eq!(view.deck_size, 10);
    }
}
