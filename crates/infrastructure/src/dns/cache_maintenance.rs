use super::cache::AnswerCacheStore;

use async_trait::async_trait;
use relay_dns_application::ports::{CacheMaintenancePort, CacheSweepOutcome};
use relay_dns_domain::DomainError;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Infrastructure adapter implementing `CacheMaintenancePort`.
pub struct DnsCacheMaintenance {
    cache: Arc<AnswerCacheStore>,
}

impl DnsCacheMaintenance {
    pub fn new(cache: Arc<AnswerCacheStore>) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl CacheMaintenancePort for DnsCacheMaintenance {
    async fn run_sweep_cycle(&self) -> Result<CacheSweepOutcome, DomainError> {
        let start = Instant::now();
        let entries_removed = self.cache.purge_expired();
        let cache_size = self.cache.len();

        let metrics = self.cache.metrics().snapshot(cache_size);
        if entries_removed > 0 {
            info!(
                entries_removed,
                cache_size,
                hit_rate = metrics.hit_rate(),
                evictions = metrics.evictions,
                elapsed_us = start.elapsed().as_micros() as u64,
                "Cache sweep completed"
            );
        } else {
            debug!(
                cache_size,
                hits = metrics.hits,
                misses = metrics.misses,
                "Cache sweep found nothing expired"
            );
        }

        Ok(CacheSweepOutcome {
            entries_removed,
            cache_size,
        })
    }
}
