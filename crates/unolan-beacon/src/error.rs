//! Error types for session discovery.

use std::io;
use std::net::SocketAddr;

use crate::SessionCode;

/// Errors that can occur while advertising or searching for a session.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    /// The UDP socket could not be bound, usually because another
    /// process already listens on the session code's port.
    #[error("failed to bind discovery socket on {addr}: {source}")]
    BindFailed {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("beacon send failed: {0}")]
    SendFailed(io::Error),

    #[error("beacon receive failed: {0}")]
    RecvFailed(io::Error),

    /// No beacon with a matching code arrived before the search timeout.
    /// The user can retry.
    #[error("no session found for code {code}")]
    ServerNotFound { code: SessionCode },

    /// A datagram did not have the `<code>:<ip>:<port>` shape.
    #[error("malformed beacon: {0:?}")]
    MalformedBeacon(String),
}
