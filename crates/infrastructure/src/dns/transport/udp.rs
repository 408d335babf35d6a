//! One leg of an upstream race over plain UDP (RFC 1035 §4.2.1).
//!
//! Each attempt owns a fresh ephemeral socket, so a reply can only come back
//! on the socket the query left from. The socket closes when the attempt is
//! dropped, whether it won, lost, or timed out.

use crate::dns::forwarding::ResponseParser;
use bytes::Bytes;
use relay_dns_application::ports::ResolvedAnswer;
use relay_dns_domain::DomainError;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::time::Instant;
use tracing::debug;

/// Larger than any acceptable reply so oversized ones are seen, not clipped.
const RECV_BUFFER_SIZE: usize = 4096;

/// Counts attempt sockets that are currently open.
#[derive(Debug, Clone, Default)]
pub struct SocketGauge(Arc<AtomicUsize>);

impl SocketGauge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> usize {
        self.0.load(Ordering::Acquire)
    }

    fn acquire(&self) -> SocketGuard {
        self.0.fetch_add(1, Ordering::AcqRel);
        SocketGuard(Arc::clone(&self.0))
    }
}

struct SocketGuard(Arc<AtomicUsize>);

impl Drop for SocketGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

pub struct UdpAttempt {
    server: SocketAddr,
    socket: UdpSocket,
    sent_at: Instant,
    // Declared last so the count drops after the socket is closed.
    _guard: SocketGuard,
}

impl UdpAttempt {
    /// Binds an ephemeral socket and sends `query` to `server` unmodified.
    pub async fn send(
        server: SocketAddr,
        query: &[u8],
        gauge: &SocketGauge,
    ) -> Result<Self, DomainError> {
        let bind_addr: SocketAddr = if server.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };

        let socket = UdpSocket::bind(bind_addr).await.map_err(|e| {
            DomainError::IoError(format!("Failed to bind UDP socket for {}: {}", server, e))
        })?;
        let guard = gauge.acquire();

        let bytes_sent = socket.send_to(query, server).await.map_err(|e| {
            DomainError::IoError(format!("Failed to send UDP query to {}: {}", server, e))
        })?;

        debug!(server = %server, bytes_sent, "UDP query sent");

        Ok(Self {
            server,
            socket,
            sent_at: Instant::now(),
            _guard: guard,
        })
    }

    pub fn server(&self) -> SocketAddr {
        self.server
    }

    /// Waits for the first datagram from the server that `parser` accepts as
    /// an answer to `question`.
    ///
    /// Datagrams from other sources and rejected replies are discarded and the
    /// socket keeps listening. Only a receive error ends the attempt early;
    /// the caller bounds the wait.
    pub async fn receive(
        self,
        transaction_id: u16,
        question: &[u8],
        parser: &ResponseParser,
    ) -> Result<ResolvedAnswer, DomainError> {
        let mut recv_buf = vec![0u8; RECV_BUFFER_SIZE];

        loop {
            let (bytes_received, from_addr) =
                self.socket.recv_from(&mut recv_buf).await.map_err(|e| {
                    DomainError::IoError(format!(
                        "Failed to receive UDP response from {}: {}",
                        self.server, e
                    ))
                })?;

            if from_addr != self.server {
                debug!(
                    expected = %self.server,
                    received_from = %from_addr,
                    "Ignoring datagram from unexpected source"
                );
                continue;
            }

            let reply = &recv_buf[..bytes_received];
            match parser.validate(reply, transaction_id, question) {
                Ok(validated) => {
                    return Ok(ResolvedAnswer {
                        server: self.server,
                        answer: Bytes::copy_from_slice(&reply[2..]),
                        ttl: validated.ttl,
                        rcode: validated.rcode,
                        negative: validated.negative,
                        latency: self.sent_at.elapsed(),
                    });
                }
                Err(e) => {
                    debug!(server = %self.server, error = %e, "Discarding upstream reply");
                }
            }
        }
    }
}
