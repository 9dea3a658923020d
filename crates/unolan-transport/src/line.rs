//! Newline-framed TCP transport using `tokio-util`'s `LinesCodec`.

use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::{SinkExt, StreamExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tokio::sync::Mutex;
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec, LinesCodecError};

use crate::{Connection, ConnectionId, Transport, TransportError};

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Longest record accepted from a peer. A full game-start snapshot is
/// well under this.
pub const MAX_LINE_LENGTH: usize = 64 * 1024;

/// A TCP listener that yields [`LineConnection`]s.
pub struct LineTransport {
    listener: TcpListener,
}

impl LineTransport {
    /// Binds a new transport to the given address.
    pub async fn bind(addr: impl ToSocketAddrs) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(TransportError::AcceptFailed)?;
        if let Ok(local) = listener.local_addr() {
            tracing::info!(%local, "line transport listening");
        }
        Ok(Self { listener })
    }
}

impl Transport for LineTransport {
    type Connection = LineConnection;
    type Error = TransportError;

    async fn accept(&mut self) -> Result<Self::Connection, Self::Error> {
        let (stream, addr) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::AcceptFailed)?;
        let conn = LineConnection::from_stream(stream, addr);
        tracing::debug!(id = %conn.id, %addr, "accepted connection");
        Ok(conn)
    }

    fn local_addr(&self) -> Result<SocketAddr, Self::Error> {
        self.listener.local_addr().map_err(TransportError::AcceptFailed)
    }
}

/// One TCP stream split into independently locked read and write halves,
/// so a task blocked in `recv` never holds up a `send`.
pub struct LineConnection {
    id: ConnectionId,
    peer: SocketAddr,
    reader: Mutex<FramedRead<OwnedReadHalf, LinesCodec>>,
    writer: Mutex<FramedWrite<OwnedWriteHalf, LinesCodec>>,
}

impl LineConnection {
    /// Opens an outgoing connection.
    ///
    /// # Errors
    /// [`TransportError::ConnectFailed`] if the TCP connect fails.
    pub async fn connect(addr: SocketAddr) -> Result<Self, TransportError> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|source| TransportError::ConnectFailed { addr, source })?;
        let conn = Self::from_stream(stream, addr);
        tracing::debug!(id = %conn.id, %addr, "connected");
        Ok(conn)
    }

    fn from_stream(stream: TcpStream, peer: SocketAddr) -> Self {
        // Records are small and latency matters more than throughput.
        let _ = stream.set_nodelay(true);
        let (read, write) = stream.into_split();
        let id = ConnectionId::new(
            NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed),
        );
        Self {
            id,
            peer,
            reader: Mutex::new(FramedRead::new(
                read,
                LinesCodec::new_with_max_length(MAX_LINE_LENGTH),
            )),
            writer: Mutex::new(FramedWrite::new(write, LinesCodec::new())),
        }
    }
}

impl Connection for LineConnection {
    type Error = TransportError;

    async fn send(&self, record: &str) -> Result<(), Self::Error> {
        if record.contains(['\n', '\r']) {
            return Err(TransportError::SendFailed(io::Error::new(
                io::ErrorKind::InvalidInput,
                "record contains a line break",
            )));
        }
        self.writer
            .lock()
            .await
            .send(record)
            .await
            .map_err(|e| TransportError::SendFailed(into_io(e)))
    }

    async fn recv(&self) -> Result<Option<String>, Self::Error> {
        match self.reader.lock().await.next().await {
            Some(Ok(line)) => Ok(Some(line)),
            Some(Err(e)) => Err(TransportError::ReceiveFailed(into_io(e))),
            None => Ok(None),
        }
    }

    async fn close(&self) -> Result<(), Self::Error> {
        let mut writer = self.writer.lock().await;
        // `FramedWrite` is a sink for any `AsRef<str>`; pin the item type.
        SinkExt::<&str>::close(&mut *writer)
            .await
            .map_err(|e| TransportError::SendFailed(into_io(e)))
    }

    fn id(&self) -> ConnectionId {
        self.id
    }

    fn peer_addr(&self) -> SocketAddr {
        self.peer
    }
}

fn into_io(err: LinesCodecError) -> io::Error {
    match err {
        LinesCodecError::Io(e) => e,
        LinesCodecError::MaxLineLengthExceeded => io::Error::new(
            io::ErrorKind::InvalidData,
            "record exceeds maximum length",
        ),
    }
}
