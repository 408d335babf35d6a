#![allow(dead_code)]

use async_trait::async_trait;
use relay_dns_application::ports::{CacheMaintenancePort, CacheSweepOutcome};
use relay_dns_domain::DomainError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

pub struct MockCacheMaintenancePort {
    sweep_call_count: Arc<AtomicU64>,
    should_fail_sweep: Arc<RwLock<bool>>,
    sweep_outcome: Arc<RwLock<CacheSweepOutcome>>,
}

impl MockCacheMaintenancePort {
    pub fn new() -> Self {
        Self {
            sweep_call_count: Arc::new(AtomicU64::new(0)),
            should_fail_sweep: Arc::new(RwLock::new(false)),
            sweep_outcome: Arc::new(RwLock::new(CacheSweepOutcome::default())),
        }
    }

    pub fn with_sweep_outcome(mut self, outcome: CacheSweepOutcome) -> Self {
        self.sweep_outcome = Arc::new(RwLock::new(outcome));
        self
    }

    pub fn sweep_call_count(&self) -> u64 {
        self.sweep_call_count.load(Ordering::Relaxed)
    }

    pub async fn set_should_fail_sweep(&self, fail: bool) {
        *self.should_fail_sweep.write().await = fail;
    }
}

impl Default for MockCacheMaintenancePort {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheMaintenancePort for MockCacheMaintenancePort {
    async fn run_sweep_cycle(&self) -> Result<CacheSweepOutcome, DomainError> {
        self.sweep_call_count.fetch_add(1, Ordering::Relaxed);
        if *self.should_fail_sweep.read().await {
            return Err(DomainError::IoError("mock sweep failure".into()));
        }
        Ok(self.sweep_outcome.read().await.clone())
    }
}
