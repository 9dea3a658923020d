//! Game configuration and phase state machine.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// GameConfig
// ---------------------------------------------------------------------------

/// Settings for one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Cards dealt to each player at the start.
    pub hand_size: usize,

    /// Fewest players a game can start with.
    pub min_players: usize,

    /// Most players a game can start with.
    pub max_players: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            hand_size: 7,
            min_players: 2,
            max_players: 4,
        }
    }
}

impl GameConfig {
    /// Returns `true` if a game may start with `players` seats filled.
    pub fn accepts(&self, players: usize) -> bool {
        (self.min_players..=self.max_players).contains(&players)
    }
}

// ---------------------------------------------------------------------------
// GamePhase
// ---------------------------------------------------------------------------

/// The lifecycle phase of a game.
///
/// Transitions are strictly ordered:
///
/// ```text
/// WaitingForPlayers → InProgress → Finished
/// ```
///
/// - **WaitingForPlayers**: seats are filling. No deck yet.
/// - **InProgress**: cards are dealt and players take turns.
/// - **Finished**: someone emptied their hand, or the game was aborted.
///   No further plays or draws are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    WaitingForPlayers,
    InProgress,
    Finished,
}

impl GamePhase {
    /// Returns `Some(next)` for the only valid forward transition.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::WaitingForPlayers => Some(Self::InProgress),
            Self::InProgress => Some(Self::Finished),
            Self::Finished => None,
        }
    }

    pub fn can_transition_to(self, target: Self) -> bool {
        self.next() == Some(target)
    }

    /// Returns `true` while plays and draws are accepted.
    pub fn is_active(self) -> bool {
        matches!(self, Self::InProgress)
    }
}

impl std::fmt::Display for GamePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WaitingForPlayers => write!(f, "WaitingForPlayers"),
            Self::InProgress => write!(f, "InProgress"),
            Self::Finished => write!(f, "Finished"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_phase_next_follows_strict_order() {
        assert_eq!(GamePhase::WaitingForPlayers.next(), Some(GamePhase::InProgress));
        assert_eq!(GamePhase::InProgress.next(), Some(GamePhase::Finished));
        assert_eq!(GamePhase::Finished.next(), None);
    }

    #[test]
    fn test_game_phase_can_transition_to() {
        assert!(GamePhase::WaitingForPlayers.can_transition_to(GamePhase::InProgress));
        assert!(!GamePhase::WaitingForPlayers.can_transition_to(GamePhase::Finished));
        assert!(!GamePhase::Finished.can_transition_to(GamePhase::InProgress));
    }

    #[test]
    fn test_game_phase_display() {
        assert_eq!(GamePhase::WaitingForPlayers.to_string(), "WaitingForPlayers");
        assert_eq!(GamePhase::Finished.to_string(), "Finished");
    }

    #[test]
    fn test_game_config_default() {
        let config = GameConfig::default();
        assert_eq!(config.hand_size, 7);
        assert!(config.accepts(2));
        assert!(config.accepts(4));
        assert!(!config.accepts(1));
        assert!(!config.accepts(5));
    }
}
