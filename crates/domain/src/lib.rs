//! relay-dns domain layer: wire codec, query model and configuration.
pub mod cache_key;
pub mod config;
pub mod dns_protocol;
pub mod dns_query;
pub mod errors;
pub mod wire;

pub use cache_key::CacheKey;
pub use config::{CliOverrides, Config, ConfigError, DnsConfig};
pub use dns_protocol::UpstreamServer;
pub use dns_query::{DnsQuery, Question};
pub use errors::{DecodeError, DomainError};
