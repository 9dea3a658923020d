//! The command surface the presentation layer drives.

use tokio::sync::mpsc;
use unolan_beacon::SessionCode;
use unolan_cards::Card;
use unolan_game::{StateChange, TableView};

use crate::UnolanError;

/// Notifications for the presentation, one per transition.
///
/// Drain it on the presentation's own task; nothing is delivered
/// in-line from the network tasks.
pub type StateChanges = mpsc::UnboundedReceiver<StateChange>;

/// A joined or hosted session: its code, the commands, and the
/// notification stream.
pub struct Session<C> {
    pub code: SessionCode,
    pub commands: C,
    pub changes: StateChanges,
}

/// Moves available to every seat, host or participant.
///
/// On the host these mutate the authoritative state and fan out to every
/// participant. On a participant they update the local prediction and
/// forward the move to the host, whose echo confirms it.
///
/// Illegal moves come back as [`UnolanError::Game`] and change nothing.
pub trait GameCommands {
    /// The nickname this seat plays under.
    fn nickname(&self) -> &str;

    /// Plays `card` from the local hand. A wild must already carry its
    /// chosen color (see [`Card::with_color`]).
    async fn play(&self, card: Card) -> Result<(), UnolanError>;

    /// Draws one card from the deck. The turn does not pass.
    async fn draw_one(&self) -> Result<Card, UnolanError>;

    /// What this seat may see of the table right now.
    async fn view(&self) -> Result<TableView, UnolanError>;

    /// Leaves the session. On the host this releases every participant.
    async fn close_game(&self) -> Result<(), UnolanError>;
}
