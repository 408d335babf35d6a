use super::{AnswerEntry, CacheMetrics};
use bytes::Bytes;
use lru::LruCache;
use relay_dns_application::ports::{AnswerCache, CacheMetricsSnapshot, CachedAnswer};
use relay_dns_domain::CacheKey;
use rustc_hash::FxBuildHasher;
use std::num::NonZeroUsize;
use std::sync::atomic::Ordering as AtomicOrdering;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::time::Instant;
use tracing::{debug, info};

type EntryMap = LruCache<CacheKey, AnswerEntry, FxBuildHasher>;

/// Bounded answer cache with insertion-order eviction.
///
/// The map is an `LruCache` that is only ever read through `peek`, so the
/// recency list is exactly the insertion order and the tail is always the
/// oldest insert. Readers share the lock; inserts, expiry removal and sweeps
/// take it exclusively, so no reader ever sees a partially replaced entry.
pub struct AnswerCacheStore {
    entries: RwLock<EntryMap>,
    max_entries: usize,
    metrics: CacheMetrics,
}

impl AnswerCacheStore {
    /// `max_entries = 0` disables caching: inserts are dropped.
    pub fn new(max_entries: usize) -> Self {
        info!(max_entries, "Initializing answer cache");

        let capacity = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: RwLock::new(LruCache::with_hasher(capacity, FxBuildHasher)),
            max_entries,
            metrics: CacheMetrics::default(),
        }
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn is_enabled(&self) -> bool {
        self.max_entries > 0
    }

    pub fn get(&self, key: &CacheKey) -> Option<CachedAnswer> {
        let now = Instant::now();

        let expired = {
            let entries = self.read();
            match entries.peek(key) {
                Some(entry) if !entry.is_expired_at(now) => {
                    self.metrics.hits.fetch_add(1, AtomicOrdering::Relaxed);
                    return Some(CachedAnswer {
                        answer: entry.answer.clone(),
                        ttl: entry.ttl,
                        remaining: entry.remaining_at(now),
                    });
                }
                Some(_) => true,
                None => false,
            }
        };

        self.metrics.misses.fetch_add(1, AtomicOrdering::Relaxed);

        if expired {
            let mut entries = self.write();
            // Another worker may have replaced it between the two locks.
            let still_expired = entries
                .peek(key)
                .is_some_and(|entry| entry.is_expired_at(now));
            if still_expired {
                entries.pop(key);
                self.metrics.expirations.fetch_add(1, AtomicOrdering::Relaxed);
                debug!(key = %key, "Removed expired entry on lookup");
            }
        }

        None
    }

    pub fn put(&self, key: CacheKey, answer: Bytes, ttl_secs: u32) {
        if self.max_entries == 0 {
            return;
        }

        let entry = AnswerEntry::new(answer, ttl_secs, Instant::now());
        let mut entries = self.write();
        let replacing = entries.contains(&key);

        if let Some((evicted, _)) = entries.push(key, entry) {
            if !replacing {
                self.metrics.evictions.fetch_add(1, AtomicOrdering::Relaxed);
                debug!(key = %evicted, "Evicted oldest entry");
            }
        }
        self.metrics.insertions.fetch_add(1, AtomicOrdering::Relaxed);
    }

    /// Removes every entry whose TTL has run out. Returns how many went.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.write();

        let expired: Vec<CacheKey> = entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            entries.pop(key);
        }

        let removed = expired.len();
        self.metrics
            .expirations
            .fetch_add(removed as u64, AtomicOrdering::Relaxed);
        removed
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.write().clear();
    }

    pub fn metrics(&self) -> &CacheMetrics {
        &self.metrics
    }

    fn read(&self) -> RwLockReadGuard<'_, EntryMap> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, EntryMap> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl AnswerCache for AnswerCacheStore {
    fn lookup(&self, key: &CacheKey) -> Option<CachedAnswer> {
        self.get(key)
    }

    fn insert(&self, key: CacheKey, answer: Bytes, ttl_secs: u32) {
        self.put(key, answer, ttl_secs);
    }

    fn len(&self) -> usize {
        AnswerCacheStore::len(self)
    }

    fn metrics(&self) -> CacheMetricsSnapshot {
        self.metrics.snapshot(AnswerCacheStore::len(self))
    }
}
