//! Beacon cadence.
//!
//! The scheduler sits inside the broadcast task's `tokio::select!` loop:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         changed = control.changed() => { /* pause / resume / stop */ }
//!         seq = scheduler.wait_for_send() => { socket.send_to(..).await; }
//!     }
//! }
//! ```

use std::time::Duration;

use rand::Rng;
use tokio::time::{self, Instant};
use tracing::{debug, trace};

/// Fixed-interval scheduler with pause/resume.
pub struct BeaconScheduler {
    interval: Duration,
    next_send: Instant,
    sent: u64,
    paused: bool,
}

impl BeaconScheduler {
    /// Creates a scheduler whose first beacon fires after a random delay
    /// in `0..initial_jitter`. Later beacons follow every `interval`.
    pub fn new(interval: Duration, initial_jitter: Duration) -> Self {
        let jitter = if initial_jitter.is_zero() {
            Duration::ZERO
        } else {
            let us = initial_jitter.as_micros() as u64;
            Duration::from_micros(rand::rng().random_range(0..us))
        };

        debug!(
            interval_ms = interval.as_millis() as u64,
            jitter_us = jitter.as_micros() as u64,
            "beacon scheduler created"
        );

        Self {
            interval,
            next_send: Instant::now() + jitter,
            sent: 0,
            paused: false,
        }
    }

    /// Waits until the next beacon is due and returns its sequence number
    /// (starting at 1).
    ///
    /// While paused this future pends forever; `tokio::select!` keeps
    /// serving its other branches.
    pub async fn wait_for_send(&mut self) -> u64 {
        if self.paused {
            std::future::pending::<()>().await;
        }

        time::sleep_until(self.next_send).await;

        // Schedule from now, not from the deadline, so a late wake-up
        // doesn't cause a burst.
        self.next_send = Instant::now() + self.interval;
        self.sent += 1;
        trace!(seq = self.sent, "beacon due");
        self.sent
    }

    /// Stops beacons until [`resume`](Self::resume). Idempotent.
    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            debug!(sent = self.sent, "beacon paused");
        }
    }

    /// Resumes beacons. The next one fires immediately, so a freed seat
    /// is advertised without waiting a full interval.
    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            self.next_send = Instant::now();
            debug!(sent = self.sent, "beacon resumed");
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Beacons fired so far.
    pub fn sent(&self) -> u64 {
        self.sent
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}
