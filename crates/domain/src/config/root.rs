use serde::{Deserialize, Serialize};
use std::net::IpAddr;

use super::dns::DnsConfig;
use super::errors::ConfigError;
use super::logging::LoggingConfig;
use super::server::ServerConfig;
use crate::dns_protocol::{parse_upstreams, UpstreamServer};

pub const MAX_UPSTREAM_SERVERS: usize = 16;

const LOCAL_CONFIG_PATH: &str = "relay-dns.toml";
const SYSTEM_CONFIG_PATH: &str = "/etc/relay-dns/config.toml";

/// Main configuration structure for relay-dns
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Listener configuration (port, bind address, concurrency)
    #[serde(default)]
    pub server: ServerConfig,

    /// Upstream and cache configuration
    #[serde(default)]
    pub dns: DnsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. relay-dns.toml in current directory
    /// 3. /etc/relay-dns/config.toml
    /// 4. Default configuration
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if std::path::Path::new(LOCAL_CONFIG_PATH).exists() {
            Self::from_file(LOCAL_CONFIG_PATH)?
        } else if std::path::Path::new(SYSTEM_CONFIG_PATH).exists() {
            Self::from_file(SYSTEM_CONFIG_PATH)?
        } else {
            Self::default()
        };

        config.apply_cli_overrides(cli_overrides);
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply command-line overrides to configuration
    pub fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(port) = overrides.dns_port {
            self.server.dns_port = port;
        }
        if let Some(bind) = overrides.bind_address {
            self.server.bind_address = bind;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
        if let Some(servers) = overrides.upstream_servers {
            if !servers.is_empty() {
                self.dns.upstream_servers = servers;
            }
        }
        if let Some(limit) = overrides.max_concurrency {
            self.server.max_concurrency = limit;
        }
    }

    /// Parsed upstream list, in configuration order.
    pub fn upstreams(&self) -> Result<Vec<UpstreamServer>, ConfigError> {
        parse_upstreams(&self.dns.upstream_servers).map_err(ConfigError::InvalidUpstream)
    }

    /// Parsed client allowlist; empty means every client is served.
    pub fn allowed_clients(&self) -> Result<Vec<IpAddr>, ConfigError> {
        self.server
            .allowed_clients
            .iter()
            .map(|entry| {
                entry.trim().parse::<IpAddr>().map_err(|_| {
                    ConfigError::Validation(format!("Allowed client '{}' is not an IP address", entry))
                })
            })
            .collect()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.dns_port == 0 {
            return Err(ConfigError::Validation("DNS port cannot be 0".to_string()));
        }

        if self.server.max_concurrency == 0 {
            return Err(ConfigError::Validation(
                "max_concurrency must be at least 1".to_string(),
            ));
        }

        if self.dns.upstream_servers.is_empty() {
            return Err(ConfigError::Validation(
                "No upstream servers configured".to_string(),
            ));
        }

        if self.dns.upstream_servers.len() > MAX_UPSTREAM_SERVERS {
            return Err(ConfigError::Validation(format!(
                "At most {} upstream servers are supported, got {}",
                MAX_UPSTREAM_SERVERS,
                self.dns.upstream_servers.len()
            )));
        }

        self.upstreams()?;

        if self.dns.query_timeout == 0 {
            return Err(ConfigError::Validation(
                "query_timeout cannot be 0".to_string(),
            ));
        }

        if self.dns.attempt_timeout == 0 {
            return Err(ConfigError::Validation(
                "attempt_timeout cannot be 0".to_string(),
            ));
        }

        if self.dns.cache_sweep_interval == 0 {
            return Err(ConfigError::Validation(
                "cache_sweep_interval cannot be 0".to_string(),
            ));
        }

        self.allowed_clients()?;

        Ok(())
    }
}

/// Command-line overrides for configuration
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub dns_port: Option<u16>,
    pub bind_address: Option<String>,
    pub log_level: Option<String>,
    pub upstream_servers: Option<Vec<String>>,
    pub max_concurrency: Option<usize>,
}
