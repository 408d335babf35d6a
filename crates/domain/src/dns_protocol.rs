use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

pub const DEFAULT_DNS_PORT: u16 = 53;

/// A plain-UDP upstream resolver address.
///
/// Accepted forms: `IP`, `IP:PORT`, `[IPv6]:PORT`, each optionally prefixed
/// with `udp://`. The port defaults to 53.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UpstreamServer(SocketAddr);

impl UpstreamServer {
    pub fn new(addr: SocketAddr) -> Self {
        Self(addr)
    }

    pub fn socket_addr(&self) -> SocketAddr {
        self.0
    }

    pub fn protocol_name(&self) -> &'static str {
        "UDP"
    }
}

impl From<SocketAddr> for UpstreamServer {
    fn from(addr: SocketAddr) -> Self {
        Self(addr)
    }
}

fn parse_host_port(s: &str) -> Option<(&str, u16)> {
    if s.starts_with('[') {
        let end = s.find(']')?;
        let host = &s[1..end];
        let rest = &s[end + 1..];
        let port_str = rest.strip_prefix(':')?;
        let port = port_str.parse::<u16>().ok()?;
        Some((host, port))
    } else {
        let (host, port_str) = s.rsplit_once(':')?;
        let port = port_str.parse::<u16>().ok()?;
        Some((host, port))
    }
}

impl FromStr for UpstreamServer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let addr_str = s.trim();
        let addr_str = addr_str.strip_prefix("udp://").unwrap_or(addr_str);

        if let Ok(ip) = addr_str.parse::<IpAddr>() {
            return Ok(Self(SocketAddr::new(ip, DEFAULT_DNS_PORT)));
        }
        if let Ok(addr) = addr_str.parse::<SocketAddr>() {
            return Ok(Self(addr));
        }
        if let Some((host, port)) = parse_host_port(addr_str) {
            if let Ok(ip) = host.parse::<IpAddr>() {
                return Ok(Self(SocketAddr::new(ip, port)));
            }
            return Err(format!(
                "Upstream '{}' must be an IP address, hostnames are not resolved",
                s
            ));
        }
        if let Some(stripped) = addr_str.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
            if let Ok(ip) = stripped.parse::<IpAddr>() {
                return Ok(Self(SocketAddr::new(ip, DEFAULT_DNS_PORT)));
            }
        }
        Err(format!(
            "Invalid upstream '{}'. Expected: IP, IP:PORT, [IPv6]:PORT or udp://IP:PORT",
            s
        ))
    }
}

impl fmt::Display for UpstreamServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "udp://{}", self.0)
    }
}

/// Parses every entry, failing on the first invalid one.
pub fn parse_upstreams<S: AsRef<str>>(entries: &[S]) -> Result<Vec<UpstreamServer>, String> {
    entries.iter().map(|e| e.as_ref().parse()).collect()
}
