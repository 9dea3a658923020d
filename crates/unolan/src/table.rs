//! Table actor: the isolated Tokio task that owns the authoritative game.
//!
//! One task holds the participant registry and the host's
//! [`GameState`]. Connection handlers and the host's own commands reach
//! it through an mpsc channel, so every join, leave and move is applied
//! one at a time in arrival order.

use rand::rngs::StdRng;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, error, info, warn};
use unolan_beacon::BeaconHandle;
use unolan_cards::{Card, CardAction};
use unolan_game::{GameConfig, GamePhase, GameState, StateChange, TableView};
use unolan_protocol::{Codec, GameEvent, JsonCodec};
use unolan_session::{Nickname, ParticipantRegistry, SessionConfig, SessionError};

use crate::UnolanError;

/// Encoded records on their way to one participant's connection.
pub(crate) type SeatSender = mpsc::UnboundedSender<String>;

/// Commands sent to the table actor through its channel.
///
/// Variants carrying a `oneshot::Sender` expect an answer; the rest are
/// fire-and-forget.
pub(crate) enum TableCommand {
    /// Seat a participant whose nickname line just arrived.
    Join {
        nickname: String,
        sender: SeatSender,
        reply: oneshot::Sender<Result<Nickname, SessionError>>,
    },

    /// A participant's connection ended.
    Leave { nickname: Nickname },

    /// An event a participant sent.
    Inbound { from: Nickname, event: GameEvent },

    /// Deal and broadcast `start_game`.
    Start {
        reply: oneshot::Sender<Result<(), UnolanError>>,
    },

    /// The host plays a card.
    Play {
        card: Card,
        reply: oneshot::Sender<Result<(), UnolanError>>,
    },

    /// The host draws a card.
    Draw {
        reply: oneshot::Sender<Result<Card, UnolanError>>,
    },

    /// The host's view of the table.
    View { reply: oneshot::Sender<TableView> },

    /// Release every seat and stop the listener.
    Close { reply: oneshot::Sender<()> },
}

/// Handle to the running table actor.
///
/// Cheap to clone: it's an `mpsc::Sender` wrapper.
#[derive(Clone)]
pub(crate) struct TableHandle {
    sender: mpsc::Sender<TableCommand>,
}

impl TableHandle {
    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> TableCommand,
    ) -> Result<T, UnolanError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(make(reply_tx))
            .await
            .map_err(|_| UnolanError::Unavailable)?;
        reply_rx.await.map_err(|_| UnolanError::Unavailable)
    }

    async fn notify(&self, cmd: TableCommand) -> Result<(), UnolanError> {
        self.sender
            .send(cmd)
            .await
            .map_err(|_| UnolanError::Unavailable)
    }

    pub(crate) async fn join(
        &self,
        nickname: &str,
        sender: SeatSender,
    ) -> Result<Nickname, UnolanError> {
        let nickname = nickname.to_string();
        Ok(self
            .request(|reply| TableCommand::Join {
                nickname,
                sender,
                reply,
            })
            .await??)
    }

    pub(crate) async fn leave(&self, nickname: Nickname) -> Result<(), UnolanError> {
        self.notify(TableCommand::Leave { nickname }).await
    }

    pub(crate) async fn inbound(
        &self,
        from: Nickname,
        event: GameEvent,
    ) -> Result<(), UnolanError> {
        self.notify(TableCommand::Inbound { from, event }).await
    }

    pub(crate) async fn start(&self) -> Result<(), UnolanError> {
        self.request(|reply| TableCommand::Start { reply }).await?
    }

    pub(crate) async fn play(&self, card: Card) -> Result<(), UnolanError> {
        self.request(|reply| TableCommand::Play { card, reply })
            .await?
    }

    pub(crate) async fn draw(&self) -> Result<Card, UnolanError> {
        self.request(|reply| TableCommand::Draw { reply }).await?
    }

    pub(crate) async fn view(&self) -> Result<TableView, UnolanError> {
        self.request(|reply| TableCommand::View { reply }).await
    }

    pub(crate) async fn close(&self) -> Result<(), UnolanError> {
        self.request(|reply| TableCommand::Close { reply }).await
    }
}

/// Everything the actor needs, gathered by the host builder.
pub(crate) struct TableSetup {
    pub(crate) session: SessionConfig,
    pub(crate) game: GameConfig,
    pub(crate) rng: StdRng,
    pub(crate) beacon: Option<BeaconHandle>,
    pub(crate) changes: mpsc::UnboundedSender<StateChange>,
    pub(crate) shutdown: watch::Sender<bool>,
}

/// The internal actor state. Runs inside a Tokio task.
struct TableActor {
    registry: ParticipantRegistry<SeatSender>,
    game: GameState,
    rng: StdRng,
    codec: JsonCodec,
    /// Running until the table fills up for good or the game starts.
    beacon: Option<BeaconHandle>,
    changes: mpsc::UnboundedSender<StateChange>,
    /// Flipped to `true` to stop the host's accept loop.
    shutdown: watch::Sender<bool>,
    /// Set once every seat has been released.
    closed: bool,
    receiver: mpsc::Receiver<TableCommand>,
}

impl TableActor {
    /// Processes commands until every handle is dropped.
    async fn run(mut self) {
        info!(
            host = %self.registry.host_nickname(),
            capacity = self.registry.config().capacity(),
            "table open"
        );

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                TableCommand::Join {
                    nickname,
                    sender,
                    reply,
                } => {
                    let result = self.handle_join(&nickname, sender);
                    let _ = reply.send(result);
                }
                TableCommand::Leave { nickname } => {
                    self.handle_leave(nickname).await;
                }
                TableCommand::Inbound { from, event } => {
                    self.handle_inbound(&from, event);
                }
                TableCommand::Start { reply } => {
                    let result = self.handle_start().await;
                    let _ = reply.send(result);
                }
                TableCommand::Play { card, reply } => {
                    let result = self.handle_play(card);
                    let _ = reply.send(result);
                }
                TableCommand::Draw { reply } => {
                    let result = self.handle_draw();
                    let _ = reply.send(result);
                }
                TableCommand::View { reply } => {
                    let _ = reply.send(self.view());
                }
                TableCommand::Close { reply } => {
                    self.teardown().await;
                    let _ = reply.send(());
                }
            }
        }

        self.teardown().await;
        info!("table actor stopped");
    }

    // -----------------------------------------------------------------------
    // Lobby
    // -----------------------------------------------------------------------

    fn handle_join(&mut self, raw: &str, sender: SeatSender) -> Result<Nickname, SessionError> {
        if self.closed || self.game.phase() != GamePhase::WaitingForPlayers {
            return Err(SessionError::SessionFull);
        }

        let nickname = self.registry.register(raw, sender)?;

        if self.registry.is_full() {
            if let Some(beacon) = &self.beacon {
                beacon.pause();
                info!(seated = self.registry.len(), "table full, beacon paused");
            }
        }
        self.notify(StateChange::Lobby);
        Ok(nickname)
    }

    async fn handle_leave(&mut self, nickname: Nickname) {
        if self.registry.remove(nickname.as_str()).is_err() {
            debug!(%nickname, "leave for a seat already released");
            return;
        }

        match self.game.phase() {
            GamePhase::WaitingForPlayers => {
                if let Some(beacon) = self.beacon.as_ref().filter(|b| b.is_paused()) {
                    beacon.resume();
                    info!(seated = self.registry.len(), "seat freed, beacon resumed");
                }
                self.notify(StateChange::Lobby);
            }
            GamePhase::InProgress => {
                warn!(%nickname, "participant left mid-game, ending session");
                self.game.abort(Some(nickname.as_str()));
                self.notify(StateChange::Error {
                    departed: Some(nickname.into_inner()),
                });
                self.teardown().await;
            }
            GamePhase::Finished => {
                info!(%nickname, "participant left after the game ended");
            }
        }
    }

    // -----------------------------------------------------------------------
    // Game
    // -----------------------------------------------------------------------

    async fn handle_start(&mut self) -> Result<(), UnolanError> {
        self.ensure_open()?;

        let capacity = self.registry.config().capacity();
        let players = self.registry.table_nicknames();
        if players.len() < capacity {
            return Err(UnolanError::TableNotFull {
                seated: players.len(),
                capacity,
            });
        }

        let start = self.game.start(&players, &mut self.rng)?;
        if let Some(beacon) = self.beacon.take() {
            beacon.stop().await;
        }

        info!(
            players = players.len(),
            first = %start.current_player,
            "game started"
        );
        self.publish(&[GameEvent::StartGame(start)]);
        Ok(())
    }

    fn handle_play(&mut self, card: Card) -> Result<(), UnolanError> {
        self.ensure_open()?;
        let host = self.registry.host_nickname().to_string();
        let events = self.game.play(&host, card).inspect_err(|e| {
            debug!(player = %host, %card, error = %e, "play refused");
        })?;
        self.warn_short_penalty(card, &events);
        self.publish(&events);
        Ok(())
    }

    fn handle_draw(&mut self) -> Result<Card, UnolanError> {
        self.ensure_open()?;
        let host = self.registry.host_nickname().to_string();
        let take = self.game.draw(&host).inspect_err(|e| {
            debug!(player = %host, error = %e, "draw refused");
        })?;
        let card = take.card;
        self.publish(&[GameEvent::TakeCard(take)]);
        Ok(card)
    }

    /// Validates a participant's move against the authoritative state and
    /// broadcasts the outcome to every seat, the sender included.
    ///
    /// Refused moves are dropped; the sender's prediction is reset by the
    /// next event it receives.
    fn handle_inbound(&mut self, from: &Nickname, event: GameEvent) {
        if self.closed {
            return;
        }
        if event.actor() != Some(from.as_str()) {
            debug!(%from, command = event.command(), "event not from its sender, dropped");
            return;
        }

        let result = match &event {
            GameEvent::Step(step) => self.game.play(&step.player, step.top_card),
            GameEvent::TakeCard(take) => self
                .game
                .draw_specific(take)
                .map(|take| vec![GameEvent::TakeCard(take)]),
            GameEvent::StartGame(_) | GameEvent::EndGame(_) => return,
        };

        match result {
            Ok(events) => {
                if let GameEvent::Step(step) = &event {
                    self.warn_short_penalty(step.top_card, &events);
                }
                self.publish(&events);
            }
            Err(e) => debug!(%from, command = event.command(), error = %e, "event refused"),
        }
    }

    /// Logs a draw-two or draw-four whose penalty the deck couldn't cover.
    fn warn_short_penalty(&self, card: Card, events: &[GameEvent]) {
        let owed = card.action().map_or(0, CardAction::penalty);
        let dealt = events
            .iter()
            .filter(|e| matches!(e, GameEvent::TakeCard(_)))
            .count();
        if dealt < owed && self.game.winner().is_none() {
            warn!(%card, owed, dealt, "deck ran out mid-penalty");
        }
    }

    /// The host's view. Before the deal, seating lists who has joined.
    fn view(&self) -> TableView {
        let view = self.game.view_for(self.registry.host_nickname().as_str());
        if self.game.phase() == GamePhase::WaitingForPlayers && !self.closed {
            view.with_lobby(&self.registry.table_nicknames())
        } else {
            view
        }
    }

    fn ensure_open(&self) -> Result<(), UnolanError> {
        if let Some(departed) = self.game.departed() {
            return Err(UnolanError::ParticipantDisconnected(departed.to_string()));
        }
        if self.closed {
            return Err(UnolanError::Unavailable);
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Fan-out
    // -----------------------------------------------------------------------

    /// Sends each event to every seat and raises its notification.
    fn publish(&mut self, events: &[GameEvent]) {
        for event in events {
            match event {
                GameEvent::StartGame(_) => {}
                GameEvent::Step(step) => info!(
                    player = %step.player,
                    card = %step.top_card,
                    next = %step.next_player,
                    "card played"
                ),
                GameEvent::TakeCard(take) => debug!(
                    player = %take.player,
                    deck = self.game.deck().len(),
                    "card drawn"
                ),
                GameEvent::EndGame(end) => info!(winner = %end.winner, "game finished"),
            }
            self.broadcast(event);
            self.notify(StateChange::from(event));
        }
    }

    fn broadcast(&self, event: &GameEvent) {
        let record = match self.codec.encode(event) {
            Ok(record) => record,
            Err(e) => {
                error!(command = event.command(), error = %e, "failed to encode event");
                return;
            }
        };
        for (nickname, seat) in self.registry.iter() {
            if seat.send(record.clone()).is_err() {
                debug!(%nickname, command = event.command(), "seat closed, event dropped");
            }
        }
    }

    /// The presentation may have dropped its receiver; that's not an error.
    fn notify(&self, change: StateChange) {
        let _ = self.changes.send(change);
    }

    /// Releases every seat, stops the beacon and the accept loop.
    ///
    /// Dropping a seat's sender ends its connection handler, which closes
    /// the stream.
    async fn teardown(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        let released = self.registry.drain();
        if let Some(beacon) = self.beacon.take() {
            beacon.stop().await;
        }
        self.shutdown.send_replace(true);
        info!(released = released.len(), "session closed");
    }
}

/// Spawns the table actor and returns a handle to it.
///
/// `channel_size` bounds the command queue; senders wait when it's full.
pub(crate) fn spawn_table(setup: TableSetup, channel_size: usize) -> TableHandle {
    let (tx, rx) = mpsc::channel(channel_size);

    let actor = TableActor {
        registry: ParticipantRegistry::new(setup.session),
        game: GameState::new(setup.game),
        rng: setup.rng,
        codec: JsonCodec,
        beacon: setup.beacon,
        changes: setup.changes,
        shutdown: setup.shutdown,
        closed: false,
        receiver: rx,
    };

    tokio::spawn(actor.run());

    TableHandle { sender: tx }
}
