use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};

/// The address of the interface that routes to the wider network.
///
/// Connecting a UDP socket sends nothing; it only asks the OS which
/// local address it would use. Falls back to loopback on hosts with no
/// route.
pub fn local_ip() -> IpAddr {
    let probe = || -> std::io::Result<IpAddr> {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?;
        socket.connect((Ipv4Addr::new(8, 8, 8, 8), 80))?;
        Ok(socket.local_addr()?.ip())
    };
    match probe() {
        Ok(ip) if !ip.is_unspecified() => ip,
        _ => IpAddr::V4(Ipv4Addr::LOCALHOST),
    }
}

/// The IP a host bound to `bind` should put in its beacon.
pub fn advertised_ip(bind: SocketAddr) -> IpAddr {
    if bind.ip().is_unspecified() {
        local_ip()
    } else {
        bind.ip()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advertised_ip_concrete_bind_is_kept() {
        let bind = SocketAddr::from(([127, 0, 0, 1], 8080));
        assert_eq!(advertised_ip(bind), IpAddr::V4(Ipv4Addr::LOCALHOST));
    }

    #[test]
    fn test_local_ip_is_never_unspecified() {
        assert!(!local_ip().is_unspecified());
    }
}
