use crate::ports::{AnswerCache, UpstreamResolver};
use relay_dns_domain::wire::{self, MAX_UDP_PAYLOAD};
use relay_dns_domain::{DnsQuery, DomainError};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// What happened to one inbound datagram. Carries at most one reply.
#[derive(Debug)]
pub enum DispatchOutcome {
    CacheHit(Vec<u8>),
    Resolved(Vec<u8>),
    ServFail {
        reply: Vec<u8>,
        reason: DomainError,
    },
    Dropped(DomainError),
}

impl DispatchOutcome {
    /// Bytes to send back to the requester, if any.
    pub fn reply(&self) -> Option<&[u8]> {
        match self {
            Self::CacheHit(reply) | Self::Resolved(reply) => Some(reply),
            Self::ServFail { reply, .. } => Some(reply),
            Self::Dropped(_) => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::CacheHit(_) => "cache_hit",
            Self::Resolved(_) => "resolved",
            Self::ServFail { .. } => "servfail",
            Self::Dropped(_) => "dropped",
        }
    }

    fn servfail(transaction_id: u16, request: &[u8], reason: DomainError) -> Self {
        let recursion_desired = wire::recursion_desired(request);
        Self::ServFail {
            reply: wire::build_servfail(transaction_id, recursion_desired).to_vec(),
            reason,
        }
    }
}

/// Per-datagram orchestration: decode, cache lookup, race on miss, reply.
///
/// Holds no per-client state; the cache is the only thing shared between
/// invocations.
pub struct HandleDnsQueryUseCase {
    cache: Arc<dyn AnswerCache>,
    resolver: Arc<dyn UpstreamResolver>,
}

impl HandleDnsQueryUseCase {
    pub fn new(cache: Arc<dyn AnswerCache>, resolver: Arc<dyn UpstreamResolver>) -> Self {
        Self { cache, resolver }
    }

    pub async fn execute(&self, datagram: &[u8], client: SocketAddr) -> DispatchOutcome {
        if datagram.len() > MAX_UDP_PAYLOAD {
            debug!(client = %client, len = datagram.len(), "Dropping oversized datagram");
            return DispatchOutcome::Dropped(DomainError::OversizedDatagram(datagram.len()));
        }

        let query = match wire::decode(datagram) {
            Ok(query) => query,
            Err(e) => {
                debug!(client = %client, error = %e, "Undecodable datagram");
                return match e.transaction_id() {
                    Some(id) => DispatchOutcome::servfail(id, datagram, e.into()),
                    None => DispatchOutcome::Dropped(e.into()),
                };
            }
        };

        let key = query.cache_key();

        if let Some(cached) = self.cache.lookup(&key) {
            debug!(
                client = %client,
                domain = %key,
                ttl_remaining = cached.remaining.as_secs(),
                "Cache hit"
            );
            return DispatchOutcome::CacheHit(Self::frame(&query, &cached.answer));
        }

        let start = Instant::now();
        match self.resolver.resolve(&query.raw, query.transaction_id).await {
            Ok(resolved) => {
                debug!(
                    client = %client,
                    domain = %key,
                    server = %resolved.server,
                    ttl = resolved.ttl,
                    negative = resolved.negative,
                    latency_ms = start.elapsed().as_millis() as u64,
                    "Resolved upstream"
                );
                let reply = Self::frame(&query, &resolved.answer);
                self.cache.insert(key, resolved.answer, resolved.ttl);
                DispatchOutcome::Resolved(reply)
            }
            Err(e) => {
                debug!(client = %client, domain = %key, error = %e, "Upstream race failed");
                DispatchOutcome::servfail(query.transaction_id, datagram, e)
            }
        }
    }

    fn frame(query: &DnsQuery, answer: &[u8]) -> Vec<u8> {
        let mut reply = wire::encode_reply(query.transaction_id, answer);
        wire::restore_question_case(&mut reply, query);
        reply
    }
}
