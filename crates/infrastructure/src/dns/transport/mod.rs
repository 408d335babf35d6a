pub mod udp;

pub use udp::{SocketGauge, UdpAttempt};
