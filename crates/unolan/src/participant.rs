//! The participant side: find the host, take a seat, mirror its game.
//!
//! A seat actor owns the connection and a [`Replica`]. Local moves are
//! predicted and forwarded; host events are reconciled against the
//! prediction and turned into notifications.

use std::net::SocketAddr;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};
use unolan_beacon::{BeaconConfig, SessionCode, find_host};
use unolan_cards::Card;
use unolan_game::{GameConfig, GamePhase, Reconcile, Replica, StateChange, TableView};
use unolan_protocol::{Codec, GameEvent, HandshakeReply, JsonCodec, ProtocolError};
use unolan_session::{Nickname, SessionError};
use unolan_transport::{Connection, LineConnection, TransportError};

use crate::handler::HANDSHAKE_TIMEOUT;
use crate::{GameCommands, Session, UnolanError};

const SEAT_CHANNEL_SIZE: usize = 16;

/// Finds the host advertising `code` and joins it as `nickname`.
///
/// # Errors
/// - [`DiscoveryError::ServerNotFound`](unolan_beacon::DiscoveryError::ServerNotFound)
///   if no beacon arrives within `config.search_timeout`.
/// - Everything [`join_at`] returns.
pub async fn join_session(
    code: SessionCode,
    nickname: &str,
    config: &BeaconConfig,
) -> Result<Session<ParticipantHandle>, UnolanError> {
    let addr = find_host(code, config).await?;
    let mut session = join_at(addr, nickname).await?;
    session.code = code;
    Ok(session)
}

/// Joins the host listening at `addr` as `nickname`, skipping discovery.
///
/// # Errors
/// - [`TransportError::ConnectFailed`] if the host can't be reached.
/// - [`SessionError::InvalidNickname`] if the name is malformed, taken, or
///   the host's own.
/// - [`SessionError::SessionFull`] if every seat is taken or the game has
///   started.
pub async fn join_at(
    addr: SocketAddr,
    nickname: &str,
) -> Result<Session<ParticipantHandle>, UnolanError> {
    let nickname = Nickname::parse(nickname)?;

    let conn = LineConnection::connect(addr).await?;
    conn.send(nickname.as_str()).await?;

    let reply = match tokio::time::timeout(HANDSHAKE_TIMEOUT, conn.recv()).await {
        Ok(Ok(Some(line))) => HandshakeReply::parse(&line)?,
        Ok(Ok(None)) => {
            return Err(TransportError::ConnectionClosed(
                "host closed before replying".into(),
            )
            .into());
        }
        Ok(Err(e)) => return Err(e.into()),
        Err(_) => {
            return Err(ProtocolError::Handshake("no reply from host".into()).into());
        }
    };

    let rejection = match reply {
        HandshakeReply::Welcome => None,
        HandshakeReply::InvalidNickname => {
            Some(SessionError::InvalidNickname(nickname.to_string()))
        }
        HandshakeReply::SessionFull => Some(SessionError::SessionFull),
    };
    if let Some(err) = rejection {
        info!(%nickname, host = %addr, %reply, "join refused");
        let _ = conn.close().await;
        return Err(err.into());
    }

    info!(%nickname, host = %addr, "joined session");

    let me = nickname.into_inner();
    let (changes_tx, changes) = mpsc::unbounded_channel();
    let (tx, rx) = mpsc::channel(SEAT_CHANNEL_SIZE);

    let seat = SeatActor {
        replica: Replica::new(me.clone(), GameConfig::default()),
        conn,
        codec: JsonCodec,
        connected: true,
        changes: changes_tx,
        receiver: rx,
    };
    tokio::spawn(seat.run());

    Ok(Session {
        code: SessionCode::from_addr(addr),
        commands: ParticipantHandle {
            sender: tx,
            nickname: me,
        },
        changes,
    })
}

// ---------------------------------------------------------------------------
// Handle
// ---------------------------------------------------------------------------

enum SeatCommand {
    Play {
        card: Card,
        reply: oneshot::Sender<Result<(), UnolanError>>,
    },
    Draw {
        reply: oneshot::Sender<Result<Card, UnolanError>>,
    },
    View {
        reply: oneshot::Sender<TableView>,
    },
    Close {
        reply: oneshot::Sender<()>,
    },
}

/// A participant's seat.
///
/// Cheap to clone; every clone talks to the same seat actor.
#[derive(Clone)]
pub struct ParticipantHandle {
    sender: mpsc::Sender<SeatCommand>,
    nickname: String,
}

impl ParticipantHandle {
    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> SeatCommand,
    ) -> Result<T, UnolanError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(make(reply_tx))
            .await
            .map_err(|_| UnolanError::Unavailable)?;
        reply_rx.await.map_err(|_| UnolanError::Unavailable)
    }
}

impl GameCommands for ParticipantHandle {
    fn nickname(&self) -> &str {
        &self.nickname
    }

    async fn play(&self, card: Card) -> Result<(), UnolanError> {
        self.request(|reply| SeatCommand::Play { card, reply })
            .await?
    }

    async fn draw_one(&self) -> Result<Card, UnolanError> {
        self.request(|reply| SeatCommand::Draw { reply }).await?
    }

    async fn view(&self) -> Result<TableView, UnolanError> {
        self.request(|reply| SeatCommand::View { reply }).await
    }

    async fn close_game(&self) -> Result<(), UnolanError> {
        self.request(|reply| SeatCommand::Close { reply }).await
    }
}

// ---------------------------------------------------------------------------
// Seat actor
// ---------------------------------------------------------------------------

struct SeatActor {
    replica: Replica,
    conn: LineConnection,
    codec: JsonCodec,
    /// Cleared when the host goes away or the seat is closed locally.
    connected: bool,
    changes: mpsc::UnboundedSender<StateChange>,
    receiver: mpsc::Receiver<SeatCommand>,
}

impl SeatActor {
    /// Serves commands until every handle is dropped, and reads the host's
    /// stream while it is open.
    async fn run(mut self) {
        loop {
            tokio::select! {
                cmd = self.receiver.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd).await,
                    None => break,
                },
                inbound = self.conn.recv(), if self.connected => match inbound {
                    Ok(Some(record)) => self.handle_record(&record),
                    Ok(None) => self.host_lost("connection closed"),
                    Err(e) => self.host_lost(&e.to_string()),
                },
            }
        }

        if self.connected {
            let _ = self.conn.close().await;
        }
        debug!(me = self.replica.me(), "seat actor stopped");
    }

    async fn handle_command(&mut self, cmd: SeatCommand) {
        match cmd {
            SeatCommand::Play { card, reply } => {
                let result = self.play(card).await;
                let _ = reply.send(result);
            }
            SeatCommand::Draw { reply } => {
                let result = self.draw().await;
                let _ = reply.send(result);
            }
            SeatCommand::View { reply } => {
                let _ = reply.send(self.replica.view());
            }
            SeatCommand::Close { reply } => {
                self.close().await;
                let _ = reply.send(());
            }
        }
    }

    async fn play(&mut self, card: Card) -> Result<(), UnolanError> {
        self.ensure_connected()?;
        let step = self.replica.predict_play(card).inspect_err(|e| {
            debug!(me = self.replica.me(), %card, error = %e, "play refused");
        })?;
        self.submit(GameEvent::Step(step)).await
    }

    async fn draw(&mut self) -> Result<Card, UnolanError> {
        self.ensure_connected()?;
        let take = self.replica.predict_draw().inspect_err(|e| {
            debug!(me = self.replica.me(), error = %e, "draw refused");
        })?;
        let card = take.card;
        self.submit(GameEvent::TakeCard(take)).await?;
        Ok(card)
    }

    /// Sends a predicted move to the host and notifies the presentation.
    /// The host's echo of it is absorbed silently. A move that can't be
    /// sent is taken back.
    async fn submit(&mut self, event: GameEvent) -> Result<(), UnolanError> {
        if let Err(e) = self.send_event(&event).await {
            self.replica.withdraw();
            warn!(
                me = self.replica.me(),
                command = event.command(),
                error = %e,
                "move not sent, prediction withdrawn"
            );
            return Err(e);
        }
        self.notify(StateChange::from(&event));
        Ok(())
    }

    async fn send_event(&self, event: &GameEvent) -> Result<(), UnolanError> {
        let record = self.codec.encode(event)?;
        self.conn.send(&record).await?;
        Ok(())
    }

    fn handle_record(&mut self, record: &str) {
        let event: GameEvent = match self.codec.decode(record) {
            Ok(event) => event,
            Err(e) => {
                warn!(me = self.replica.me(), error = %e, "undecodable record from host, skipped");
                return;
            }
        };

        let me = self.replica.me().to_string();
        let command = event.command();
        match self.replica.receive(&event) {
            Ok(Reconcile::Echoed) => {
                debug!(%me, command, "host confirmed local move");
                return;
            }
            Ok(Reconcile::Applied) => debug!(%me, command, "event applied"),
            Ok(Reconcile::Diverged { discarded }) => {
                warn!(%me, command, discarded, "host overrode local prediction");
            }
            // The replica has moved on regardless; report the drift.
            Err(e) => warn!(%me, command, error = %e, "replica out of sync with host"),
        }

        match &event {
            GameEvent::StartGame(start) => {
                info!(%me, first = %start.current_player, "game started");
            }
            GameEvent::EndGame(end) => info!(%me, winner = %end.winner, "game finished"),
            GameEvent::Step(_) | GameEvent::TakeCard(_) => {}
        }
        self.notify(StateChange::from(&event));
    }

    /// The host's stream ended. Unless the game was already over, that
    /// ends the session with an `error` notification.
    fn host_lost(&mut self, reason: &str) {
        self.connected = false;
        let me = self.replica.me().to_string();

        if self.replica.state().phase() == GamePhase::Finished {
            info!(%me, reason, "host closed the session");
            return;
        }
        warn!(%me, reason, "lost connection to host");
        self.replica.abort(None);
        self.notify(StateChange::Error { departed: None });
    }

    async fn close(&mut self) {
        if !self.connected {
            return;
        }
        self.connected = false;

        let me = self.replica.me().to_string();
        if self.replica.state().phase().is_active() {
            self.replica.abort(Some(&me));
        }
        let _ = self.conn.close().await;
        info!(%me, "left the session");
    }

    fn ensure_connected(&self) -> Result<(), UnolanError> {
        if self.connected {
            Ok(())
        } else {
            Err(UnolanError::Unavailable)
        }
    }

    fn notify(&self, change: StateChange) {
        let _ = self.changes.send(change);
    }
}
