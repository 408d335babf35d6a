pub mod cache;
pub mod cache_maintenance;
pub mod forwarding;
pub mod server;
pub mod transport;
pub mod upstream;

pub use cache::{AnswerCacheStore, CacheMetrics};
pub use cache_maintenance::DnsCacheMaintenance;
pub use forwarding::{ResponseParser, ValidatedReply};
pub use server::DnsServerHandler;
pub use transport::{SocketGauge, UdpAttempt};
pub use upstream::{UpstreamRace, UpstreamRaceConfig};
