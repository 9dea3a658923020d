//! Per-connection handler: nickname handshake and event relay.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Receive the nickname line
//!   2. Ask the table for a seat, reply `WELCOME`, `INVALID_NICKNAME` or
//!      `SESSION_FULL`
//!   3. Loop: forward inbound events to the table, write outbound records

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info};
use unolan_protocol::{Codec, GameEvent, HandshakeReply, ProtocolError};
use unolan_session::{Nickname, SessionError};
use unolan_transport::{Connection, LineConnection};

use crate::UnolanError;
use crate::host::HostState;
use crate::table::{SeatSender, TableHandle};

/// How long either side waits for the other's handshake line.
pub(crate) const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Drop guard that frees a participant's seat when the handler exits.
///
/// `Drop` is synchronous, so the leave is sent from a spawned task.
struct SeatGuard {
    nickname: Nickname,
    table: TableHandle,
}

impl Drop for SeatGuard {
    fn drop(&mut self) {
        let nickname = self.nickname.clone();
        let table = self.table.clone();
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            runtime.spawn(async move {
                let _ = table.leave(nickname).await;
            });
        }
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(
    conn: LineConnection,
    state: Arc<HostState>,
) -> Result<(), UnolanError> {
    let conn_id = conn.id();
    debug!(%conn_id, peer = %conn.peer_addr(), "handling new connection");

    // --- Step 1: Handshake ---
    let (seat_tx, mut seat_rx) = mpsc::unbounded_channel();
    let Some(nickname) = perform_handshake(&conn, &state, seat_tx).await? else {
        let _ = conn.close().await;
        return Ok(());
    };

    // The seat is held from here on; the guard releases it on any exit.
    let _guard = SeatGuard {
        nickname: nickname.clone(),
        table: state.table.clone(),
    };
    conn.send(HandshakeReply::Welcome.as_str()).await?;
    info!(%conn_id, %nickname, "participant seated");

    // --- Step 2: Relay loop ---
    loop {
        tokio::select! {
            inbound = conn.recv() => match inbound {
                Ok(Some(record)) => match state.codec.decode::<GameEvent>(&record) {
                    Ok(event) => {
                        debug!(%nickname, command = event.command(), "event received");
                        state.table.inbound(nickname.clone(), event).await?;
                    }
                    Err(e) => debug!(%nickname, error = %e, "failed to decode event"),
                },
                Ok(None) => {
                    info!(%nickname, "connection closed cleanly");
                    break;
                }
                Err(e) => {
                    debug!(%nickname, error = %e, "recv error");
                    break;
                }
            },
            outbound = seat_rx.recv() => match outbound {
                Some(record) => {
                    if let Err(e) = conn.send(&record).await {
                        debug!(%nickname, error = %e, "send error");
                        break;
                    }
                }
                None => {
                    info!(%nickname, "seat released by host");
                    break;
                }
            },
        }
    }

    let _ = conn.close().await;
    // _guard drops here → leave is sent to the table.
    Ok(())
}

/// Reads the nickname line and asks the table for a seat.
///
/// Returns `None` after sending a rejection.
async fn perform_handshake(
    conn: &LineConnection,
    state: &HostState,
    seat: SeatSender,
) -> Result<Option<Nickname>, UnolanError> {
    let raw = match tokio::time::timeout(HANDSHAKE_TIMEOUT, conn.recv()).await {
        Ok(Ok(Some(line))) => line,
        Ok(Ok(None)) => {
            return Err(ProtocolError::Handshake(
                "connection closed before nickname".into(),
            )
            .into());
        }
        Ok(Err(e)) => return Err(e.into()),
        Err(_) => {
            return Err(ProtocolError::Handshake("nickname timed out".into()).into());
        }
    };

    let reply = match state.table.join(&raw, seat).await {
        Ok(nickname) => return Ok(Some(nickname)),
        Err(UnolanError::Session(SessionError::InvalidNickname(_))) => {
            HandshakeReply::InvalidNickname
        }
        Err(UnolanError::Session(SessionError::SessionFull)) => HandshakeReply::SessionFull,
        Err(e) => return Err(e),
    };

    info!(conn_id = %conn.id(), nickname = ?raw, %reply, "handshake rejected");
    conn.send(reply.as_str()).await?;
    Ok(None)
}
