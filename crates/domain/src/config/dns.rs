use serde::{Deserialize, Serialize};

/// Forwarding and cache settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DnsConfig {
    /// Upstream resolvers raced for every cache miss.
    #[serde(default = "default_upstream_servers")]
    pub upstream_servers: Vec<String>,

    /// Overall budget for one race, in milliseconds.
    #[serde(default = "default_query_timeout")]
    pub query_timeout: u64,

    /// Budget for a single upstream attempt, in milliseconds. Never exceeds
    /// `query_timeout` in practice.
    #[serde(default = "default_attempt_timeout")]
    pub attempt_timeout: u64,

    /// 0 disables caching.
    #[serde(default = "default_cache_max_entries")]
    pub cache_max_entries: usize,

    /// Seconds between cache sweeps.
    #[serde(default = "default_cache_sweep_interval")]
    pub cache_sweep_interval: u64,

    #[serde(default = "default_cache_min_negative_ttl")]
    pub cache_min_negative_ttl: u32,

    #[serde(default = "default_cache_max_ttl")]
    pub cache_max_ttl: u32,
}

impl Default for DnsConfig {
    fn default() -> Self {
        Self {
            upstream_servers: default_upstream_servers(),
            query_timeout: default_query_timeout(),
            attempt_timeout: default_attempt_timeout(),
            cache_max_entries: default_cache_max_entries(),
            cache_sweep_interval: default_cache_sweep_interval(),
            cache_min_negative_ttl: default_cache_min_negative_ttl(),
            cache_max_ttl: default_cache_max_ttl(),
        }
    }
}

fn default_upstream_servers() -> Vec<String> {
    vec!["8.8.8.8:53".to_string(), "1.1.1.1:53".to_string()]
}

fn default_query_timeout() -> u64 {
    1000
}

fn default_attempt_timeout() -> u64 {
    1000
}

fn default_cache_max_entries() -> usize {
    500_000
}

fn default_cache_sweep_interval() -> u64 {
    600
}

fn default_cache_min_negative_ttl() -> u32 {
    60
}

fn default_cache_max_ttl() -> u32 {
    86_400
}
