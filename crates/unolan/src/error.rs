//! Unified error type for the Unolan session coordinator.

use unolan_beacon::DiscoveryError;
use unolan_game::GameError;
use unolan_protocol::ProtocolError;
use unolan_session::SessionError;
use unolan_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each wrapped variant lets `?` convert
/// sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum UnolanError {
    /// Stream-level failure, including `ConnectFailed` on join.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A record that could not be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// `ServerNotFound` and other discovery failures.
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    /// `InvalidNickname`, `SessionFull` and registry errors.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A refused move, or `EmptyDeck` on a draw.
    #[error(transparent)]
    Game(#[from] GameError),

    /// A participant left mid-game and the session was torn down.
    #[error("{0} left the game")]
    ParticipantDisconnected(String),

    /// The host tried to deal before every seat was taken.
    #[error("{seated} of {capacity} seats taken")]
    TableNotFull { seated: usize, capacity: usize },

    /// The session is closed: the host went away or `close_game` ran.
    #[error("session is closed")]
    Unavailable,
}

#[cfg(test)]
mod tests {
    use unolan_beacon::SessionCode;
    use unolan_cards::CardError;

    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::ConnectionClosed("gone".into());
        let unolan_err: UnolanError = err.into();
        assert!(matches!(unolan_err, UnolanError::Transport(_)));
        assert!(unolan_err.to_string().contains("gone"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::InvalidMessage("bad".into());
        let unolan_err: UnolanError = err.into();
        assert!(matches!(unolan_err, UnolanError::Protocol(_)));
    }

    #[test]
    fn test_from_discovery_error() {
        let err = DiscoveryError::ServerNotFound {
            code: SessionCode::new(8080),
        };
        let unolan_err: UnolanError = err.into();
        assert!(matches!(unolan_err, UnolanError::Discovery(_)));
        assert!(unolan_err.to_string().contains("8080"));
    }

    #[test]
    fn test_from_session_error() {
        let err = SessionError::InvalidNickname("Ann".into());
        let unolan_err: UnolanError = err.into();
        assert!(matches!(
            unolan_err,
            UnolanError::Session(SessionError::InvalidNickname(_))
        ));
    }

    #[test]
    fn test_from_game_error_keeps_empty_deck() {
        let err = GameError::from(CardError::EmptyDeck);
        let unolan_err: UnolanError = err.into();
        assert!(matches!(
            unolan_err,
            UnolanError::Game(GameError::Card(CardError::EmptyDeck))
        ));
    }

    #[test]
    fn test_participant_disconnected_display() {
        let err = UnolanError::ParticipantDisconnected("Bob".into());
        assert_eq!(err.to_string(), "Bob left the game");
    }
}
