//! Beacon and search over loopback UDP.
//!
//! The search side binds `127.0.0.1:0` and the beacon is aimed at that
//! port, so the tests never need the broadcast address.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use tokio::net::UdpSocket;
use unolan_beacon::{
    Beacon, BeaconConfig, DiscoveryError, SessionCode, find_host_on, spawn_beacon,
};

const LOOPBACK: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

fn fast_config() -> BeaconConfig {
    BeaconConfig {
        interval: Duration::from_millis(20),
        target: LOOPBACK,
        search_timeout: Duration::from_secs(2),
        poll_timeout: Duration::from_millis(100),
        initial_jitter: Duration::ZERO,
    }
}

async fn listener() -> (UdpSocket, SessionCode) {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let code = SessionCode::from_addr(socket.local_addr().unwrap());
    (socket, code)
}

#[tokio::test]
async fn test_find_host_receives_running_beacon() {
    let (socket, code) = listener().await;
    let host = SocketAddr::from(([127, 0, 0, 1], 40123));
    let handle = spawn_beacon(fast_config(), Beacon::new(code, host))
        .await
        .unwrap();

    let found = find_host_on(&socket, code, &fast_config()).await.unwrap();
    assert_eq!(found, host);

    handle.stop().await;
}

#[tokio::test]
async fn test_find_host_without_beacon_returns_server_not_found() {
    let (socket, code) = listener().await;
    let config = BeaconConfig {
        search_timeout: Duration::from_millis(300),
        ..fast_config()
    };

    let result = find_host_on(&socket, code, &config).await;
    assert!(matches!(
        result,
        Err(DiscoveryError::ServerNotFound { code: c }) if c == code
    ));
}

#[tokio::test]
async fn test_find_host_skips_malformed_and_foreign_beacons() {
    let (socket, code) = listener().await;
    let target = socket.local_addr().unwrap();
    let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();

    sender.send_to(b"hello there", target).await.unwrap();
    sender.send_to(b"1:127.0.0.1:1", target).await.unwrap();
    let good = format!("{code}:127.0.0.1:5555");
    sender.send_to(good.as_bytes(), target).await.unwrap();

    let found = find_host_on(&socket, code, &fast_config()).await.unwrap();
    assert_eq!(found, SocketAddr::from(([127, 0, 0, 1], 5555)));
}

#[tokio::test]
async fn test_paused_beacon_is_silent_until_resumed() {
    let (socket, code) = listener().await;
    let host = SocketAddr::from(([127, 0, 0, 1], 40124));
    let handle = spawn_beacon(fast_config(), Beacon::new(code, host))
        .await
        .unwrap();

    // Drain whatever was sent before the pause took effect.
    handle.pause();
    assert!(handle.is_paused());
    tokio::time::sleep(Duration::from_millis(60)).await;
    let mut buf = [0u8; 64];
    while socket.try_recv_from(&mut buf).is_ok() {}

    let quiet = BeaconConfig {
        search_timeout: Duration::from_millis(200),
        ..fast_config()
    };
    assert!(find_host_on(&socket, code, &quiet).await.is_err());

    handle.resume();
    let found = find_host_on(&socket, code, &fast_config()).await.unwrap();
    assert_eq!(found, host);

    handle.stop().await;
}
