//! The host's broadcast task.

use std::net::{Ipv4Addr, SocketAddr};

use tokio::net::UdpSocket;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::{Beacon, BeaconConfig, BeaconScheduler, DiscoveryError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BeaconControl {
    Running,
    Paused,
    Stopped,
}

/// Controls a running beacon task.
///
/// Dropping the handle stops the task.
pub struct BeaconHandle {
    control: watch::Sender<BeaconControl>,
    task: JoinHandle<()>,
}

impl BeaconHandle {
    pub fn pause(&self) {
        self.control.send_replace(BeaconControl::Paused);
    }

    pub fn resume(&self) {
        self.control.send_replace(BeaconControl::Running);
    }

    pub fn is_paused(&self) -> bool {
        *self.control.borrow() == BeaconControl::Paused
    }

    /// Stops broadcasting for good and waits for the task to exit.
    pub async fn stop(self) {
        self.control.send_replace(BeaconControl::Stopped);
        let _ = self.task.await;
    }
}

/// Binds a broadcast-enabled UDP socket and starts sending `beacon` to
/// `config.target` on the session code's port every `config.interval`.
///
/// # Errors
/// [`DiscoveryError::BindFailed`] if no UDP socket can be bound, or
/// [`DiscoveryError::SendFailed`] if broadcasting cannot be enabled.
pub async fn spawn_beacon(
    config: BeaconConfig,
    beacon: Beacon,
) -> Result<BeaconHandle, DiscoveryError> {
    let config = config.validated();
    let bind_addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0));
    let socket = UdpSocket::bind(bind_addr)
        .await
        .map_err(|source| DiscoveryError::BindFailed {
            addr: bind_addr,
            source,
        })?;
    socket.set_broadcast(true).map_err(DiscoveryError::SendFailed)?;

    let target = SocketAddr::new(config.target, beacon.code.port());
    let (control, control_rx) = watch::channel(BeaconControl::Running);
    let scheduler = BeaconScheduler::new(config.interval, config.initial_jitter);

    info!(code = %beacon.code, %target, "beacon started");
    let task = tokio::spawn(run(socket, target, beacon, scheduler, control_rx));

    Ok(BeaconHandle { control, task })
}

async fn run(
    socket: UdpSocket,
    target: SocketAddr,
    beacon: Beacon,
    mut scheduler: BeaconScheduler,
    mut control: watch::Receiver<BeaconControl>,
) {
    let payload = beacon.to_string();

    loop {
        tokio::select! {
            changed = control.changed() => {
                if changed.is_err() {
                    break;
                }
                match *control.borrow_and_update() {
                    BeaconControl::Running => scheduler.resume(),
                    BeaconControl::Paused => scheduler.pause(),
                    BeaconControl::Stopped => break,
                }
            }
            seq = scheduler.wait_for_send() => {
                match socket.send_to(payload.as_bytes(), target).await {
                    Ok(_) => debug!(seq, %target, "beacon sent"),
                    // A lost beacon is retried on the next interval.
                    Err(e) => warn!(seq, %target, error = %e, "beacon send failed"),
                }
            }
        }
    }

    info!(code = %beacon.code, sent = scheduler.sent(), "beacon stopped");
}
