use relay_dns_application::ports::CacheMaintenancePort;
use relay_dns_application::use_cases::HandleDnsQueryUseCase;
use relay_dns_domain::Config;
use relay_dns_infrastructure::dns::{
    AnswerCacheStore, DnsCacheMaintenance, UpstreamRace, UpstreamRaceConfig,
};
use std::net::IpAddr;
use std::sync::Arc;
use tracing::info;

/// Everything the listener and the background jobs share, built once.
pub struct DnsServices {
    pub cache: Arc<AnswerCacheStore>,
    pub resolver: Arc<UpstreamRace>,
    pub handler_use_case: Arc<HandleDnsQueryUseCase>,
    pub cache_maintenance: Arc<dyn CacheMaintenancePort>,
    pub allowed_clients: Vec<IpAddr>,
}

impl DnsServices {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let upstreams = config.upstreams()?;
        let allowed_clients = config.allowed_clients()?;

        let race_config = UpstreamRaceConfig::new(&upstreams, config.dns.query_timeout)
            .with_attempt_timeout(config.dns.attempt_timeout)
            .with_ttl_bounds(config.dns.cache_min_negative_ttl, config.dns.cache_max_ttl);
        let resolver = Arc::new(UpstreamRace::new(race_config));

        info!(
            servers = ?resolver.servers(),
            timeout_ms = config.dns.query_timeout,
            "Upstream race configured"
        );

        let cache = Arc::new(AnswerCacheStore::new(config.dns.cache_max_entries));
        info!(
            max_entries = cache.max_entries(),
            enabled = cache.is_enabled(),
            "Answer cache initialized"
        );

        let handler_use_case = Arc::new(HandleDnsQueryUseCase::new(
            cache.clone(),
            resolver.clone(),
        ));

        let cache_maintenance: Arc<dyn CacheMaintenancePort> =
            Arc::new(DnsCacheMaintenance::new(cache.clone()));

        if !allowed_clients.is_empty() {
            info!(count = allowed_clients.len(), "Client allowlist active");
        }

        Ok(Self {
            cache,
            resolver,
            handler_use_case,
            cache_maintenance,
            allowed_clients,
        })
    }
}
