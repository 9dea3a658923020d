//! Integration tests for the beacon cadence.
//!
//! Uses `tokio::time::pause()` so `sleep_until` resolves as soon as the
//! clock is advanced.

use std::time::Duration;

use tokio::time::{self, Instant};
use unolan_beacon::BeaconScheduler;

const INTERVAL: Duration = Duration::from_secs(5);

#[tokio::test(start_paused = true)]
async fn test_wait_for_send_first_beacon_fires_immediately_without_jitter() {
    let mut s = BeaconScheduler::new(INTERVAL, Duration::ZERO);
    let start = Instant::now();

    assert_eq!(s.wait_for_send().await, 1);
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_wait_for_send_follows_interval() {
    let mut s = BeaconScheduler::new(INTERVAL, Duration::ZERO);
    s.wait_for_send().await;
    let after_first = Instant::now();

    assert_eq!(s.wait_for_send().await, 2);
    assert_eq!(after_first.elapsed(), INTERVAL);
    assert_eq!(s.sent(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_jitter_delays_first_beacon_within_bound() {
    let jitter = Duration::from_millis(250);
    let mut s = BeaconScheduler::new(INTERVAL, jitter);
    let start = Instant::now();

    s.wait_for_send().await;
    assert!(start.elapsed() < jitter);
}

#[tokio::test(start_paused = true)]
async fn test_paused_scheduler_never_fires() {
    let mut s = BeaconScheduler::new(INTERVAL, Duration::ZERO);
    s.pause();
    assert!(s.is_paused());

    let fired = time::timeout(INTERVAL * 10, s.wait_for_send()).await;
    assert!(fired.is_err(), "paused scheduler must not fire");
    assert_eq!(s.sent(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_resume_fires_without_waiting_full_interval() {
    let mut s = BeaconScheduler::new(INTERVAL, Duration::ZERO);
    s.wait_for_send().await;
    s.pause();
    time::advance(Duration::from_secs(1)).await;
    s.resume();

    let resumed_at = Instant::now();
    assert_eq!(s.wait_for_send().await, 2);
    assert_eq!(resumed_at.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_pause_and_resume_are_idempotent() {
    let mut s = BeaconScheduler::new(INTERVAL, Duration::ZERO);
    s.pause();
    s.pause();
    assert!(s.is_paused());
    s.resume();
    s.resume();
    assert!(!s.is_paused());
}
