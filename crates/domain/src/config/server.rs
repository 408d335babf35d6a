use serde::{Deserialize, Serialize};

/// Listener settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_dns_port")]
    pub dns_port: u16,

    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Upper bound on datagrams being dispatched at the same time.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Client IPs allowed to query; empty accepts everyone.
    #[serde(default)]
    pub allowed_clients: Vec<String>,

    /// Soft RLIMIT_NOFILE requested at startup (0 leaves it untouched).
    #[serde(default = "default_fd_limit")]
    pub fd_limit: u64,
}

impl ServerConfig {
    pub fn listen_addr(&self) -> String {
        if self.bind_address.contains(':') && !self.bind_address.starts_with('[') {
            format!("[{}]:{}", self.bind_address, self.dns_port)
        } else {
            format!("{}:{}", self.bind_address, self.dns_port)
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            dns_port: default_dns_port(),
            bind_address: default_bind_address(),
            max_concurrency: default_max_concurrency(),
            allowed_clients: vec![],
            fd_limit: default_fd_limit(),
        }
    }
}

fn default_dns_port() -> u16 {
    53
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_max_concurrency() -> usize {
    50
}

fn default_fd_limit() -> u64 {
    65_536
}
