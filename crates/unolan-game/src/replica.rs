//! A participant's copy of the game, with optimistic local moves.
//!
//! The participant keeps two states:
//!
//! ```text
//! confirmed  = start_game + every host event so far
//! predicted  = confirmed + local moves the host hasn't echoed yet
//! ```
//!
//! A local play or draw is applied to `predicted` at once and queued as
//! pending. When the host broadcasts the same event back, it is applied
//! to `confirmed` and popped from the queue; `predicted` already
//! contains it, so nothing changes and no notification is due.
//!
//! Any other host event is applied to `confirmed` and `predicted` is
//! rebuilt from it, dropping whatever was still pending.

use std::collections::VecDeque;

use unolan_cards::Card;
use unolan_protocol::{GameEvent, Step, TakeCard};

use crate::{GameConfig, GameError, GameState, TableView};

/// What [`Replica::receive`] did with a host event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconcile {
    /// The event echoed the oldest pending local move.
    Echoed,
    /// A new event, applied with nothing pending.
    Applied,
    /// The host's event contradicted the local prediction. `discarded`
    /// pending moves were thrown away.
    Diverged { discarded: usize },
}

/// Confirmed and predicted copies of the game for one participant.
#[derive(Debug, Clone)]
pub struct Replica {
    me: String,
    confirmed: GameState,
    predicted: GameState,
    pending: VecDeque<GameEvent>,
}

impl Replica {
    pub fn new(me: impl Into<String>, config: GameConfig) -> Self {
        let state = GameState::new(config);
        Self {
            me: me.into(),
            confirmed: state.clone(),
            predicted: state,
            pending: VecDeque::new(),
        }
    }

    pub fn me(&self) -> &str {
        &self.me
    }

    /// Plays `card` locally and returns the `step` to send to the host.
    ///
    /// # Errors
    /// Any rule violation; the predicted state is unchanged on error.
    pub fn predict_play(&mut self, card: Card) -> Result<Step, GameError> {
        let step = self.predicted.play_step(&self.me, card)?;
        self.pending.push_back(GameEvent::Step(step.clone()));
        Ok(step)
    }

    /// Draws locally and returns the `take_card` to send to the host.
    ///
    /// # Errors
    /// [`GameError::NotYourTurn`] or
    /// [`CardError::EmptyDeck`](unolan_cards::CardError::EmptyDeck).
    pub fn predict_draw(&mut self) -> Result<TakeCard, GameError> {
        let take = self.predicted.draw(&self.me)?;
        self.pending.push_back(GameEvent::TakeCard(take.clone()));
        Ok(take)
    }

    /// Applies a host event and reconciles the prediction.
    ///
    /// The event is always applied to the confirmed state. An `Err` means
    /// the confirmed state reported drift (e.g. a card missing from the
    /// local deck); the replica has still moved on.
    pub fn receive(&mut self, event: &GameEvent) -> Result<Reconcile, GameError> {
        let applied = self.confirmed.apply(event);

        let outcome = if self.pending.front() == Some(event) {
            self.pending.pop_front();
            Reconcile::Echoed
        } else {
            let discarded = self.pending.len();
            self.pending.clear();
            self.predicted = self.confirmed.clone();
            if discarded == 0 {
                Reconcile::Applied
            } else {
                Reconcile::Diverged { discarded }
            }
        };

        applied.map(|()| outcome)
    }

    /// Takes back the newest pending move, e.g. when it never reached the
    /// host. The prediction is rebuilt from the confirmed state and the
    /// moves still pending.
    pub fn withdraw(&mut self) -> Option<GameEvent> {
        let withdrawn = self.pending.pop_back()?;

        let mut predicted = self.confirmed.clone();
        let replayed = self
            .pending
            .iter()
            .take_while(|event| predicted.apply(event).is_ok())
            .count();
        self.pending.truncate(replayed);
        self.predicted = predicted;

        Some(withdrawn)
    }

    /// Marks the game aborted because `departed` left (or the host
    /// vanished, with `None`).
    pub fn abort(&mut self, departed: Option<&str>) {
        self.confirmed.abort(departed);
        self.predicted.abort(departed);
        self.pending.clear();
    }

    /// The state the presentation should show.
    pub fn state(&self) -> &GameState {
        &self.predicted
    }

    /// The state built from host events only.
    pub fn confirmed(&self) -> &GameState {
        &self.confirmed
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn view(&self) -> TableView {
        self.predicted.view_for(&self.me)
    }
}

#[cfg(test)]
mod tests {
    use unolan_cards::{Color, Face};
    use unolan_protocol::StartGame;

    use super::*;

    fn red(n: u8) -> Card {
        Card::number(Color::Red, n)
    }

    fn start() -> GameEvent {
        GameEvent::StartGame(StartGame {
            player_count: 2,
            turn_queue: vec!["Bob".into(), "Ann".into()],
            current_player: "Bob".into(),
            top_card: red(5),
            full_deck_snapshot: vec![Card::number(Color::Blue, 1), Card::number(Color::Blue, 2)],
            nicknames: vec!["Ann".into(), "Bob".into()],
            per_player_hands: [
                ("Ann".to_string(), vec![red(1), red(2)]),
                ("Bob".to_string(), vec![red(3), Card::colored(Color::Red, Face::Skip)]),
            ]
            .into_iter()
            .collect(),
        })
    }

    fn bob_replica() -> Replica {
        let mut replica = Replica::new("Bob", GameConfig::default());
        assert_eq!(replica.receive(&start()).unwrap(), Reconcile::Applied);
        replica
    }

    #[test]
    fn test_predict_play_applies_locally_and_queues() {
        let mut replica = bob_replica();
        let step = replica.predict_play(red(3)).unwrap();

        assert_eq!(step.next_player, "Ann");
        assert_eq!(replica.pending(), 1);
        assert_eq!(replica.state().current_player(), Some("Ann"));
        assert_eq!(replica.confirmed().current_player(), Some("Bob"));
    }

    #[test]
    fn test_receive_echo_pops_pending_without_change() {
        let mut replica = bob_replica();
        let step = replica.predict_play(red(3)).unwrap();
        let before = replica.view();

        let outcome = replica.receive(&GameEvent::Step(step)).unwrap();

        assert_eq!(outcome, Reconcile::Echoed);
        assert_eq!(replica.pending(), 0);
        assert_eq!(replica.view(), before);
        assert_eq!(
            replica.confirmed().snapshot(),
            replica.state().snapshot()
        );
    }

    #[test]
    fn test_receive_divergent_event_resets_prediction() {
        let mut replica = bob_replica();
        replica.predict_draw().unwrap();
        assert_eq!(replica.state().hand("Bob").unwrap().len(), 3);

        // The host settled a different move: Bob played his skip.
        let host_step = GameEvent::Step(Step {
            player: "Bob".into(),
            top_card: Card::colored(Color::Red, Face::Skip),
            next_player: "Bob".into(),
        });
        let outcome = replica.receive(&host_step).unwrap();

        assert_eq!(outcome, Reconcile::Diverged { discarded: 1 });
        assert_eq!(replica.pending(), 0);
        assert_eq!(replica.state().hand("Bob").unwrap(), [red(3)]);
        assert_eq!(replica.state().deck().len(), 2);
    }

    #[test]
    fn test_predict_play_out_of_turn_is_rejected() {
        let mut replica = Replica::new("Ann", GameConfig::default());
        replica.receive(&start()).unwrap();
        assert!(matches!(
            replica.predict_play(red(1)),
            Err(GameError::NotYourTurn { .. })
        ));
        assert_eq!(replica.pending(), 0);
    }

    #[test]
    fn test_abort_marks_departure() {
        let mut replica = bob_replica();
        replica.abort(Some("Ann"));
        let view = replica.view();
        assert_eq!(view.departed.as_deref(), Some("Ann"));
        assert!(!view.is_my_turn());
    }

    #[test]
    fn test_withdraw_restores_state_before_prediction() {
        let mut replica = bob_replica();
        let before = replica.view();
        let step = replica.predict_play(red(3)).unwrap();

        assert_eq!(replica.withdraw(), Some(GameEvent::Step(step)));
        assert_eq!(replica.pending(), 0);
        assert_eq!(replica.view(), before);
        assert_eq!(replica.withdraw(), None);
    }

    #[test]
    fn test_withdraw_keeps_earlier_pending_moves() {
        let mut replica = bob_replica();
        replica.predict_draw().unwrap();
        let after_draw = replica.view();
        replica.predict_play(red(3)).unwrap();

        replica.withdraw();

        assert_eq!(replica.pending(), 1);
        assert_eq!(replica.view(), after_draw);
    }
}
