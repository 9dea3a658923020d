//! State-change notifications.
//!
//! The presentation layer receives one [`StateChange`] per transition
//! and re-reads the [`TableView`](crate::TableView) to refresh itself.

use std::fmt;

use unolan_cards::CardAction;
use unolan_protocol::GameEvent;

/// Which transition just happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateChange {
    /// A participant joined or left before the game started.
    Lobby,
    StartGame,
    /// A plain number card was played.
    Step { player: String },
    /// An action or wild card was played.
    Action { player: String, action: CardAction },
    TakeCard { player: String },
    EndGame { winner: String },
    /// The session ended abnormally. `departed` names the player who left,
    /// or is `None` when the host itself went away.
    Error { departed: Option<String> },
}

impl StateChange {
    /// The notification tag: `start_game`, `step`, an action name,
    /// `take_card`, `end_game`, `error` or `lobby`.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Lobby => "lobby",
            Self::StartGame => "start_game",
            Self::Step { .. } => "step",
            Self::Action { action, .. } => action.as_str(),
            Self::TakeCard { .. } => "take_card",
            Self::EndGame { .. } => "end_game",
            Self::Error { .. } => "error",
        }
    }

    /// Returns `true` for the tags that end the session.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::EndGame { .. } | Self::Error { .. })
    }
}

impl From<&GameEvent> for StateChange {
    fn from(event: &GameEvent) -> Self {
        match event {
            GameEvent::StartGame(_) => Self::StartGame,
            GameEvent::Step(step) => match step.top_card.action() {
                Some(action) => Self::Action {
                    player: step.player.clone(),
                    action,
                },
                None => Self::Step {
                    player: step.player.clone(),
                },
            },
            GameEvent::TakeCard(take) => Self::TakeCard {
                player: take.player.clone(),
            },
            GameEvent::EndGame(end) => Self::EndGame {
                winner: end.winner.clone(),
            },
        }
    }
}

impl fmt::Display for StateChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[cfg(test)]
mod tests {
    use unolan_cards::{Card, Color, Face};
    use unolan_protocol::{EndGame, Step};

    use super::*;

    fn step(card: Card) -> GameEvent {
        GameEvent::Step(Step {
            player: "Ann".into(),
            top_card: card,
            next_player: "Bob".into(),
        })
    }

    #[test]
    fn test_from_step_number_is_step_tag() {
        let change = StateChange::from(&step(Card::number(Color::Red, 3)));
        assert_eq!(change.tag(), "step");
    }

    #[test]
    fn test_from_step_action_uses_action_name() {
        let skip = StateChange::from(&step(Card::colored(Color::Red, Face::Skip)));
        assert_eq!(skip.tag(), "skip");

        let four = StateChange::from(&step(Card::draw_four().with_color(Color::Blue)));
        assert_eq!(four.tag(), "draw_four");
        assert_eq!(
            four,
            StateChange::Action {
                player: "Ann".into(),
                action: CardAction::DrawFour
            }
        );
    }

    #[test]
    fn test_terminal_tags() {
        let end = StateChange::from(&GameEvent::EndGame(EndGame { winner: "Ann".into() }));
        assert!(end.is_terminal());
        assert_eq!(end.to_string(), "end_game");
        assert!(StateChange::Error { departed: None }.is_terminal());
        assert!(!StateChange::Lobby.is_terminal());
    }
}
