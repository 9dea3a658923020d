//! `Host` builder, accept loop and the host's command handle.
//!
//! This is the entry point for hosting a session. It ties the layers
//! together: transport → beacon → table actor → connection handlers.

use std::net::SocketAddr;
use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info};
use unolan_beacon::{Beacon, BeaconConfig, SessionCode, advertised_ip, spawn_beacon};
use unolan_cards::Card;
use unolan_game::{GameConfig, TableView};
use unolan_protocol::JsonCodec;
use unolan_session::{DEFAULT_NICKNAMES, SessionConfig};
use unolan_transport::{LineTransport, Transport};

use crate::handler::handle_connection;
use crate::table::{TableHandle, TableSetup, spawn_table};
use crate::{GameCommands, Session, StateChanges, UnolanError};

/// Address a host listens on unless told otherwise. The port doubles as
/// the session code.
pub const DEFAULT_BIND: &str = "0.0.0.0:8080";

/// Commands the table actor may have queued before it applies back
/// pressure.
const TABLE_CHANNEL_SIZE: usize = 64;

/// Shared state passed to each connection handler task.
pub(crate) struct HostState {
    pub(crate) table: TableHandle,
    pub(crate) codec: JsonCodec,
}

/// Builder for configuring and starting a hosted session.
///
/// # Example
///
/// ```rust,ignore
/// use unolan::prelude::*;
///
/// let session = Host::builder()
///     .nickname("Ann")
///     .capacity(3)
///     .start()
///     .await?;
/// println!("session code: {}", session.code);
/// ```
pub struct HostBuilder {
    bind_addr: String,
    capacity: usize,
    nickname: String,
    beacon: BeaconConfig,
    game: GameConfig,
    seed: Option<u64>,
}

impl HostBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: DEFAULT_BIND.to_string(),
            capacity: SessionConfig::MAX_CAPACITY,
            nickname: DEFAULT_NICKNAMES[0].to_string(),
            beacon: BeaconConfig::default(),
            game: GameConfig::default(),
            seed: None,
        }
    }

    /// Sets the address to listen on.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Seats at the table, the host's included (2 to 4).
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// The host's own nickname.
    pub fn nickname(mut self, nickname: &str) -> Self {
        self.nickname = nickname.to_string();
        self
    }

    pub fn beacon_config(mut self, config: BeaconConfig) -> Self {
        self.beacon = config;
        self
    }

    pub fn game_config(mut self, config: GameConfig) -> Self {
        self.game = config;
        self
    }

    /// Seeds the shuffle and seating order, for reproducible deals.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Binds the listener, starts the beacon and the table actor.
    ///
    /// # Errors
    /// - [`UnolanError::Session`] for a bad capacity or host nickname.
    /// - [`UnolanError::Transport`] if the address can't be bound.
    /// - [`UnolanError::Discovery`] if the beacon socket can't be opened.
    pub async fn build(self) -> Result<Host, UnolanError> {
        let session = SessionConfig::new(self.capacity, &self.nickname)?;
        let nickname = session.host_nickname().to_string();

        let transport = LineTransport::bind(self.bind_addr.as_str()).await?;
        let local_addr = transport.local_addr()?;
        let code = SessionCode::from_addr(local_addr);
        let advertised = SocketAddr::new(advertised_ip(local_addr), local_addr.port());

        let beacon = spawn_beacon(self.beacon, Beacon::new(code, advertised)).await?;

        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let (changes_tx, changes) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown) = watch::channel(false);

        let table = spawn_table(
            TableSetup {
                session,
                game: self.game,
                rng,
                beacon: Some(beacon),
                changes: changes_tx,
                shutdown: shutdown_tx,
            },
            TABLE_CHANNEL_SIZE,
        );

        info!(%code, addr = %advertised, host = %nickname, "session hosted");

        Ok(Host {
            transport,
            state: Arc::new(HostState {
                table: table.clone(),
                codec: JsonCodec,
            }),
            handle: HostHandle { table, nickname },
            changes: Some(changes),
            code,
            shutdown,
        })
    }

    /// Builds the host and runs its accept loop on a background task.
    pub async fn start(self) -> Result<Session<HostHandle>, UnolanError> {
        let mut host = self.build().await?;
        let changes = host.take_changes().ok_or(UnolanError::Unavailable)?;
        let session = Session {
            code: host.code(),
            commands: host.handle(),
            changes,
        };

        tokio::spawn(async move {
            if let Err(e) = host.run().await {
                error!(error = %e, "host stopped with error");
            }
        });

        Ok(session)
    }
}

impl Default for HostBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Hosts a session on [`DEFAULT_BIND`] with default settings.
pub async fn start_session(
    capacity: usize,
    nickname: &str,
) -> Result<Session<HostHandle>, UnolanError> {
    HostBuilder::new()
        .capacity(capacity)
        .nickname(nickname)
        .start()
        .await
}

/// A bound host, not yet accepting.
///
/// Call [`run()`](Self::run) to start accepting participants.
pub struct Host {
    transport: LineTransport,
    state: Arc<HostState>,
    handle: HostHandle,
    changes: Option<StateChanges>,
    code: SessionCode,
    shutdown: watch::Receiver<bool>,
}

impl Host {
    /// Creates a new builder.
    pub fn builder() -> HostBuilder {
        HostBuilder::new()
    }

    /// The code participants type to find this host.
    pub fn code(&self) -> SessionCode {
        self.code
    }

    pub fn local_addr(&self) -> Result<SocketAddr, UnolanError> {
        Ok(self.transport.local_addr()?)
    }

    pub fn handle(&self) -> HostHandle {
        self.handle.clone()
    }

    /// The notification stream. Returns `None` once taken.
    pub fn take_changes(&mut self) -> Option<StateChanges> {
        self.changes.take()
    }

    /// Runs the accept loop.
    ///
    /// Spawns a handler task for each connection. Returns once the
    /// session is closed, either by [`GameCommands::close_game`] or by a
    /// participant leaving mid-game.
    pub async fn run(mut self) -> Result<(), UnolanError> {
        info!(code = %self.code, "accepting participants");

        loop {
            tokio::select! {
                _ = self.shutdown.wait_for(|closed| *closed) => break,
                accepted = self.transport.accept() => match accepted {
                    Ok(conn) => {
                        let state = Arc::clone(&self.state);
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(conn, state).await {
                                debug!(error = %e, "connection ended with error");
                            }
                        });
                    }
                    Err(e) => {
                        error!(error = %e, "accept failed");
                    }
                },
            }
        }

        info!(code = %self.code, "listener closed");
        Ok(())
    }
}

/// The host's seat at its own table.
///
/// Cheap to clone; every clone talks to the same table actor.
#[derive(Clone)]
pub struct HostHandle {
    table: TableHandle,
    nickname: String,
}

impl HostHandle {
    /// Deals and broadcasts `start_game`.
    ///
    /// # Errors
    /// - [`UnolanError::TableNotFull`] until every seat is taken.
    /// - [`UnolanError::Game`] with `AlreadyStarted` on a second call.
    pub async fn start_game(&self) -> Result<(), UnolanError> {
        self.table.start().await
    }
}

impl GameCommands for HostHandle {
    fn nickname(&self) -> &str {
        &self.nickname
    }

    async fn play(&self, card: Card) -> Result<(), UnolanError> {
        self.table.play(card).await
    }

    async fn draw_one(&self) -> Result<Card, UnolanError> {
        self.table.draw().await
    }

    async fn view(&self) -> Result<TableView, UnolanError> {
        self.table.view().await
    }

    async fn close_game(&self) -> Result<(), UnolanError> {
        self.table.close().await
    }
}
