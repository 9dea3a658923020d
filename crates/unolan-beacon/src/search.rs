//! The participant's side of discovery.

use std::net::{Ipv4Addr, SocketAddr};

use tokio::net::UdpSocket;
use tokio::time::{self, Instant};
use tracing::{debug, info, warn};

use crate::{Beacon, BeaconConfig, DiscoveryError, SessionCode};

/// Largest datagram read. Beacons are a few dozen bytes.
const MAX_DATAGRAM: usize = 512;

/// Listens on the code's port for a matching beacon and returns the
/// host's stream address.
///
/// # Errors
/// - [`DiscoveryError::BindFailed`] if the port is already in use.
/// - [`DiscoveryError::ServerNotFound`] after `config.search_timeout`.
pub async fn find_host(
    code: SessionCode,
    config: &BeaconConfig,
) -> Result<SocketAddr, DiscoveryError> {
    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, code.port()));
    let socket = UdpSocket::bind(addr)
        .await
        .map_err(|source| DiscoveryError::BindFailed { addr, source })?;
    find_host_on(&socket, code, config).await
}

/// Like [`find_host`] but on an already-bound socket.
///
/// Datagrams that don't parse, or carry another session's code, are
/// skipped.
pub async fn find_host_on(
    socket: &UdpSocket,
    code: SessionCode,
    config: &BeaconConfig,
) -> Result<SocketAddr, DiscoveryError> {
    let config = config.clone().validated();
    let deadline = Instant::now() + config.search_timeout;
    let mut buf = [0u8; MAX_DATAGRAM];

    info!(%code, timeout_s = config.search_timeout.as_secs(), "searching for host");

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            warn!(%code, "no host found");
            return Err(DiscoveryError::ServerNotFound { code });
        }

        let wait = remaining.min(config.poll_timeout);
        let (len, from) = match time::timeout(wait, socket.recv_from(&mut buf)).await {
            Ok(Ok(received)) => received,
            Ok(Err(e)) => return Err(DiscoveryError::RecvFailed(e)),
            Err(_) => {
                debug!(%code, "no beacon yet, still waiting");
                continue;
            }
        };

        let text = String::from_utf8_lossy(&buf[..len]);
        match Beacon::parse(&text) {
            Ok(beacon) if beacon.code == code => {
                info!(%code, host = %beacon.host_addr(), "host found");
                return Ok(beacon.host_addr());
            }
            Ok(beacon) => {
                debug!(%from, other = %beacon.code, "beacon for another session");
            }
            Err(e) => warn!(%from, error = %e, "ignoring datagram"),
        }
    }
}
