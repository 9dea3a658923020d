use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use crate::DiscoveryError;

/// The short numeric code players type to join a session.
///
/// It is the host's listening port, which is also the UDP port the
/// beacon is sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionCode(u16);

impl SessionCode {
    pub fn new(port: u16) -> Self {
        Self(port)
    }

    pub fn from_addr(addr: SocketAddr) -> Self {
        Self(addr.port())
    }

    /// The UDP port a participant listens on while searching.
    pub fn port(self) -> u16 {
        self.0
    }
}

impl fmt::Display for SessionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionCode {
    type Err = DiscoveryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u16>()
            .ok()
            .filter(|port| *port != 0)
            .map(Self)
            .ok_or_else(|| DiscoveryError::MalformedBeacon(s.to_string()))
    }
}

/// One discovery datagram: `<code>:<ip>:<port>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Beacon {
    pub code: SessionCode,
    pub ip: IpAddr,
    pub port: u16,
}

impl Beacon {
    pub fn new(code: SessionCode, addr: SocketAddr) -> Self {
        Self {
            code,
            ip: addr.ip(),
            port: addr.port(),
        }
    }

    /// Where the participant should open its stream.
    pub fn host_addr(&self) -> SocketAddr {
        SocketAddr::new(self.ip, self.port)
    }

    /// Parses a received datagram.
    ///
    /// The code is everything before the first `:` and the port everything
    /// after the last one, so an IPv6 address in the middle still parses.
    ///
    /// # Errors
    /// [`DiscoveryError::MalformedBeacon`] if the text doesn't fit.
    pub fn parse(text: &str) -> Result<Self, DiscoveryError> {
        let malformed = || DiscoveryError::MalformedBeacon(text.to_string());
        let text = text.trim();

        let (code, rest) = text.split_once(':').ok_or_else(malformed)?;
        let (ip, port) = rest.rsplit_once(':').ok_or_else(malformed)?;

        Ok(Self {
            code: code.parse().map_err(|_| malformed())?,
            ip: ip.parse().map_err(|_| malformed())?,
            port: port.parse().map_err(|_| malformed())?,
        })
    }
}

impl fmt::Display for Beacon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.code, self.ip, self.port)
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;

    #[test]
    fn test_beacon_display_format() {
        let beacon = Beacon::new(
            SessionCode::new(8080),
            SocketAddr::from(([192, 168, 1, 20], 8080)),
        );
        assert_eq!(beacon.to_string(), "8080:192.168.1.20:8080");
    }

    #[test]
    fn test_beacon_parse_valid() {
        let beacon = Beacon::parse("8080:10.0.0.5:8080\n").unwrap();
        assert_eq!(beacon.code, SessionCode::new(8080));
        assert_eq!(beacon.ip, IpAddr::V4(Ipv4Addr::new(10, 0, 0, 5)));
        assert_eq!(beacon.host_addr(), SocketAddr::from(([10, 0, 0, 5], 8080)));
    }

    #[test]
    fn test_beacon_parse_ipv6_middle() {
        let beacon = Beacon::parse("9000:::1:9000").unwrap();
        assert_eq!(beacon.ip, "::1".parse::<IpAddr>().unwrap());
        assert_eq!(beacon.port, 9000);
    }

    #[test]
    fn test_beacon_parse_garbage_returns_malformed() {
        for text in ["", "8080", "8080:nohost:1", "abc:127.0.0.1:1", "1:127.0.0.1:x"] {
            assert!(
                matches!(Beacon::parse(text), Err(DiscoveryError::MalformedBeacon(_))),
                "{text:?}"
            );
        }
    }

    #[test]
    fn test_session_code_parse() {
        assert_eq!("8080".parse::<SessionCode>().unwrap(), SessionCode::new(8080));
        assert_eq!(" 4000 ".parse::<SessionCode>().unwrap().port(), 4000);
        assert!("0".parse::<SessionCode>().is_err());
        assert!("70000".parse::<SessionCode>().is_err());
    }
}
