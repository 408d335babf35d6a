use async_trait::async_trait;
use bytes::Bytes;
use relay_dns_domain::DomainError;
use std::net::SocketAddr;
use std::time::Duration;

/// The reply that won a race, already validated.
#[derive(Debug, Clone)]
pub struct ResolvedAnswer {
    pub server: SocketAddr,
    /// Reply bytes after the id slot, ready to be cached.
    pub answer: Bytes,
    pub ttl: u32,
    pub rcode: u8,
    /// NXDOMAIN or NOERROR without answers.
    pub negative: bool,
    pub latency: Duration,
}

#[async_trait]
pub trait UpstreamResolver: Send + Sync {
    /// Forwards `raw_query` unchanged and returns the first valid reply whose
    /// id equals `transaction_id`.
    async fn resolve(
        &self,
        raw_query: &[u8],
        transaction_id: u16,
    ) -> Result<ResolvedAnswer, DomainError>;
}
