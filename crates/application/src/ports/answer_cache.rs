use bytes::Bytes;
use relay_dns_domain::CacheKey;
use std::time::Duration;

/// A live cache entry handed out to the dispatcher.
#[derive(Debug, Clone)]
pub struct CachedAnswer {
    /// Upstream reply without its two id bytes.
    pub answer: Bytes,
    /// TTL the entry was stored with.
    pub ttl: u32,
    pub remaining: Duration,
}

/// Snapshot of cache counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheMetricsSnapshot {
    pub total_entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub insertions: u64,
    pub evictions: u64,
    pub expirations: u64,
}

impl CacheMetricsSnapshot {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64 * 100.0
        }
    }
}

/// Port for the shared answer cache.
///
/// Implementations are called from many workers at once and must never hand
/// out an entry whose TTL has run out.
pub trait AnswerCache: Send + Sync {
    fn lookup(&self, key: &CacheKey) -> Option<CachedAnswer>;

    fn insert(&self, key: CacheKey, answer: Bytes, ttl_secs: u32);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn metrics(&self) -> CacheMetricsSnapshot;
}
