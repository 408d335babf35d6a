use crate::dns::forwarding::ResponseParser;
use crate::dns::transport::{SocketGauge, UdpAttempt};
use async_trait::async_trait;
use futures::future::join_all;
use futures::stream::FuturesUnordered;
use futures::StreamExt;
use relay_dns_application::ports::{ResolvedAnswer, UpstreamResolver};
use relay_dns_domain::wire;
use relay_dns_domain::{DomainError, UpstreamServer};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct UpstreamRaceConfig {
    pub servers: Vec<SocketAddr>,
    /// Budget for a single upstream; capped by `overall_timeout`.
    pub attempt_timeout: Duration,
    /// Deadline for the whole race. Authoritative.
    pub overall_timeout: Duration,
    pub min_negative_ttl: u32,
    pub max_ttl: u32,
}

impl UpstreamRaceConfig {
    pub fn new(servers: &[UpstreamServer], timeout_ms: u64) -> Self {
        Self {
            servers: servers.iter().map(UpstreamServer::socket_addr).collect(),
            attempt_timeout: Duration::from_millis(timeout_ms),
            overall_timeout: Duration::from_millis(timeout_ms),
            min_negative_ttl: 60,
            max_ttl: 86_400,
        }
    }

    pub fn with_attempt_timeout(mut self, timeout_ms: u64) -> Self {
        self.attempt_timeout = Duration::from_millis(timeout_ms);
        self
    }

    pub fn with_ttl_bounds(mut self, min_negative_ttl: u32, max_ttl: u32) -> Self {
        self.min_negative_ttl = min_negative_ttl;
        self.max_ttl = max_ttl;
        self
    }
}

/// Sends each query to every upstream at once and keeps the first valid
/// reply.
///
/// All attempts are driven from the calling task through one
/// `FuturesUnordered`, so there is a single wait per race and a single
/// deadline. Losing attempts are dropped, closing their sockets, before
/// `resolve` returns.
pub struct UpstreamRace {
    servers: Vec<SocketAddr>,
    attempt_timeout: Duration,
    overall_timeout: Duration,
    parser: ResponseParser,
    gauge: SocketGauge,
}

impl UpstreamRace {
    pub fn new(config: UpstreamRaceConfig) -> Self {
        Self {
            attempt_timeout: config.attempt_timeout.min(config.overall_timeout),
            overall_timeout: config.overall_timeout,
            parser: ResponseParser::new(config.min_negative_ttl, config.max_ttl),
            servers: config.servers,
            gauge: SocketGauge::new(),
        }
    }

    pub fn servers(&self) -> &[SocketAddr] {
        &self.servers
    }

    /// Attempt sockets alive right now. Zero whenever no race is running.
    pub fn open_sockets(&self) -> usize {
        self.gauge.current()
    }

    async fn run(
        &self,
        raw_query: &[u8],
        transaction_id: u16,
    ) -> Result<ResolvedAnswer, DomainError> {
        if self.servers.is_empty() {
            return Err(DomainError::NoUpstreamServers);
        }
        let Some(question) = wire::first_question(raw_query) else {
            return Err(DomainError::MalformedQuery(
                "query has no readable question to match replies against".into(),
            ));
        };

        let sends = self
            .servers
            .iter()
            .map(|&server| UdpAttempt::send(server, raw_query, &self.gauge));

        let mut attempts = Vec::with_capacity(self.servers.len());
        for result in join_all(sends).await {
            match result {
                Ok(attempt) => attempts.push(attempt),
                Err(e) => warn!(error = %e, "Upstream left the race"),
            }
        }

        if attempts.is_empty() {
            return Err(DomainError::AllUpstreamsFailedToSend);
        }

        debug!(
            id = transaction_id,
            upstreams = attempts.len(),
            "Racing upstreams"
        );

        let parser = &self.parser;
        let attempt_timeout = self.attempt_timeout;
        let mut pending: FuturesUnordered<_> = attempts
            .into_iter()
            .map(|attempt| async move {
                let server = attempt.server();
                let receive = attempt.receive(transaction_id, question, parser);
                match timeout(attempt_timeout, receive).await {
                    Ok(result) => result,
                    Err(_) => {
                        debug!(server = %server, "Upstream attempt timed out");
                        Err(DomainError::AllUpstreamsTimedOut(
                            attempt_timeout.as_millis() as u64,
                        ))
                    }
                }
            })
            .collect();

        let winner = timeout(self.overall_timeout, async {
            while let Some(result) = pending.next().await {
                match result {
                    Ok(answer) => return Some(answer),
                    Err(e) => debug!(error = %e, "Upstream attempt ended without an answer"),
                }
            }
            None
        })
        .await;

        drop(pending);

        match winner {
            Ok(Some(answer)) => {
                debug!(
                    server = %answer.server,
                    latency_ms = answer.latency.as_millis() as u64,
                    "Fastest valid reply"
                );
                Ok(answer)
            }
            Ok(None) | Err(_) => Err(DomainError::AllUpstreamsTimedOut(
                self.overall_timeout.as_millis() as u64,
            )),
        }
    }
}

#[async_trait]
impl UpstreamResolver for UpstreamRace {
    async fn resolve(
        &self,
        raw_query: &[u8],
        transaction_id: u16,
    ) -> Result<ResolvedAnswer, DomainError> {
        self.run(raw_query, transaction_id).await
    }
}
