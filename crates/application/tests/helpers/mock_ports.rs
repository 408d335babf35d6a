#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use relay_dns_application::ports::{
    AnswerCache, CacheMetricsSnapshot, CachedAnswer, ResolvedAnswer, UpstreamResolver,
};
use relay_dns_domain::{CacheKey, DomainError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// Map-backed cache without expiry.
#[derive(Clone, Default)]
pub struct MockAnswerCache {
    entries: Arc<RwLock<HashMap<CacheKey, (Bytes, u32)>>>,
    lookups: Arc<AtomicU64>,
    inserts: Arc<AtomicU64>,
}

impl MockAnswerCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, key: CacheKey, answer: &[u8], ttl: u32) {
        self.entries
            .write()
            .unwrap()
            .insert(key, (Bytes::copy_from_slice(answer), ttl));
    }

    pub fn get(&self, key: &CacheKey) -> Option<(Bytes, u32)> {
        self.entries.read().unwrap().get(key).cloned()
    }

    pub fn lookup_count(&self) -> u64 {
        self.lookups.load(Ordering::Relaxed)
    }

    pub fn insert_count(&self) -> u64 {
        self.inserts.load(Ordering::Relaxed)
    }
}

impl AnswerCache for MockAnswerCache {
    fn lookup(&self, key: &CacheKey) -> Option<CachedAnswer> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        self.entries
            .read()
            .unwrap()
            .get(key)
            .map(|(answer, ttl)| CachedAnswer {
                answer: answer.clone(),
                ttl: *ttl,
                remaining: Duration::from_secs(*ttl as u64),
            })
    }

    fn insert(&self, key: CacheKey, answer: Bytes, ttl_secs: u32) {
        self.inserts.fetch_add(1, Ordering::Relaxed);
        self.entries.write().unwrap().insert(key, (answer, ttl_secs));
    }

    fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    fn metrics(&self) -> CacheMetricsSnapshot {
        CacheMetricsSnapshot {
            total_entries: self.len(),
            ..Default::default()
        }
    }
}

/// Resolver that answers every query from a fixed script.
#[derive(Clone)]
pub struct MockUpstreamResolver {
    outcome: Arc<RwLock<Result<ResolvedAnswer, DomainError>>>,
    calls: Arc<AtomicU64>,
    last_query: Arc<RwLock<Option<(Vec<u8>, u16)>>>,
}

impl MockUpstreamResolver {
    pub fn failing(error: DomainError) -> Self {
        Self {
            outcome: Arc::new(RwLock::new(Err(error))),
            calls: Arc::new(AtomicU64::new(0)),
            last_query: Arc::new(RwLock::new(None)),
        }
    }

    pub fn answering(answer: ResolvedAnswer) -> Self {
        let mock = Self::failing(DomainError::NoUpstreamServers);
        mock.set_outcome(Ok(answer));
        mock
    }

    pub fn set_outcome(&self, outcome: Result<ResolvedAnswer, DomainError>) {
        *self.outcome.write().unwrap() = outcome;
    }

    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    pub fn last_query(&self) -> Option<(Vec<u8>, u16)> {
        self.last_query.read().unwrap().clone()
    }
}

#[async_trait]
impl UpstreamResolver for MockUpstreamResolver {
    async fn resolve(
        &self,
        raw_query: &[u8],
        transaction_id: u16,
    ) -> Result<ResolvedAnswer, DomainError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        *self.last_query.write().unwrap() = Some((raw_query.to_vec(), transaction_id));
        self.outcome.read().unwrap().clone()
    }
}
