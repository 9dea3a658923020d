use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use tracing::warn;

/// Timing and addressing for discovery, shared by host and participant.
#[derive(Debug, Clone)]
pub struct BeaconConfig {
    /// Time between two beacons.
    pub interval: Duration,
    /// Where beacons are sent. The port is always the session code.
    pub target: IpAddr,
    /// How long a participant searches before giving up.
    pub search_timeout: Duration,
    /// Longest single wait on the socket during a search. Each expiry
    /// is logged and the search continues until `search_timeout`.
    pub poll_timeout: Duration,
    /// Random delay (0..max) before the first beacon, so hosts started
    /// together don't broadcast in lockstep.
    pub initial_jitter: Duration,
}

impl Default for BeaconConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            target: IpAddr::V4(Ipv4Addr::BROADCAST),
            search_timeout: Duration::from_secs(15),
            poll_timeout: Duration::from_secs(5),
            initial_jitter: Duration::from_millis(250),
        }
    }
}

impl BeaconConfig {
    /// Shortest interval accepted. Anything faster floods the LAN.
    pub const MIN_INTERVAL: Duration = Duration::from_millis(10);

    /// Beacons to `target` instead of the broadcast address. Used for
    /// loopback tests and for networks that drop broadcasts.
    pub fn with_target(target: IpAddr) -> Self {
        Self {
            target,
            ..Default::default()
        }
    }

    /// Clamps out-of-range values so the config is safe to use.
    ///
    /// - `interval` raised to [`Self::MIN_INTERVAL`].
    /// - `poll_timeout` forced to be non-zero and ≤ `search_timeout`.
    pub fn validated(mut self) -> Self {
        if self.interval < Self::MIN_INTERVAL {
            warn!(
                interval_ms = self.interval.as_millis() as u64,
                "beacon interval below minimum, clamping"
            );
            self.interval = Self::MIN_INTERVAL;
        }
        if self.poll_timeout.is_zero() || self.poll_timeout > self.search_timeout {
            self.poll_timeout = self.search_timeout.max(Duration::from_millis(1));
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_lan_cadence() {
        let cfg = BeaconConfig::default();
        assert_eq!(cfg.interval, Duration::from_secs(5));
        assert_eq!(cfg.search_timeout, Duration::from_secs(15));
        assert_eq!(cfg.target, IpAddr::V4(Ipv4Addr::BROADCAST));
    }

    #[test]
    fn test_validated_clamps_tiny_interval() {
        let cfg = BeaconConfig {
            interval: Duration::ZERO,
            ..Default::default()
        }
        .validated();
        assert_eq!(cfg.interval, BeaconConfig::MIN_INTERVAL);
    }

    #[test]
    fn test_validated_caps_poll_to_search_timeout() {
        let cfg = BeaconConfig {
            search_timeout: Duration::from_secs(2),
            poll_timeout: Duration::from_secs(5),
            ..Default::default()
        }
        .validated();
        assert_eq!(cfg.poll_timeout, Duration::from_secs(2));
    }
}
