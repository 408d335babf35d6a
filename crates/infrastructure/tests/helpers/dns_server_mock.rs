#![allow(dead_code)]
use super::wire_builders::{
    answer_reply, nxdomain_reply, query as build_query, servfail_reply, truncated_reply, with_id,
};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::oneshot;

/// How the mock upstream reacts to each query it receives.
#[derive(Debug, Clone)]
pub enum MockBehaviour {
    /// NOERROR with one A record per TTL.
    Answer(Vec<u32>),
    /// NXDOMAIN, optionally with an SOA `(record ttl, minimum)`.
    NxDomain(Option<(u32, u32)>),
    ServFail,
    Truncated,
    /// A well-formed answer carrying the query id plus one.
    WrongId,
    /// A well-formed answer for another name, carrying the query id.
    OtherName(String),
    /// Bytes that are not a DNS message, echoing the query id.
    Garbage,
    /// Never replies.
    Silent,
    Delayed(Duration, Box<MockBehaviour>),
    /// Sends every reply of every listed behaviour, in order.
    Sequence(Vec<MockBehaviour>),
}

impl MockBehaviour {
    pub fn answer(ttl: u32) -> Self {
        Self::Answer(vec![ttl])
    }

    pub fn delayed(delay_ms: u64, inner: MockBehaviour) -> Self {
        Self::Delayed(Duration::from_millis(delay_ms), Box::new(inner))
    }

    fn replies(&self, query: &[u8]) -> (Duration, Vec<Vec<u8>>) {
        if query.len() < 12 {
            return (Duration::ZERO, vec![]);
        }
        let id = u16::from_be_bytes([query[0], query[1]]);
        match self {
            Self::Answer(ttls) => (Duration::ZERO, vec![answer_reply(query, ttls)]),
            Self::NxDomain(soa) => (Duration::ZERO, vec![nxdomain_reply(query, *soa)]),
            Self::ServFail => (Duration::ZERO, vec![servfail_reply(query)]),
            Self::Truncated => (Duration::ZERO, vec![truncated_reply(query)]),
            Self::WrongId => (
                Duration::ZERO,
                vec![with_id(answer_reply(query, &[60]), id.wrapping_add(1))],
            ),
            Self::OtherName(name) => (
                Duration::ZERO,
                vec![answer_reply(&build_query(id, name), &[60])],
            ),
            Self::Garbage => {
                let mut junk = id.to_be_bytes().to_vec();
                junk.extend_from_slice(&[0x81, 0x80, 0xFF, 0xFF, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00]);
                junk.extend_from_slice(&[0x07, 0xAB, 0xCD]);
                (Duration::ZERO, vec![junk])
            }
            Self::Silent => (Duration::ZERO, vec![]),
            Self::Delayed(delay, inner) => {
                let (extra, replies) = inner.replies(query);
                (*delay + extra, replies)
            }
            Self::Sequence(steps) => (
                Duration::ZERO,
                steps.iter().flat_map(|s| s.replies(query).1).collect(),
            ),
        }
    }
}

pub struct MockDnsServer {
    addr: SocketAddr,
    queries: Arc<AtomicUsize>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockDnsServer {
    /// Binds an ephemeral loopback port.
    pub async fn start(behaviour: MockBehaviour) -> Result<(Self, SocketAddr), std::io::Error> {
        let socket = Arc::new(UdpSocket::bind("127.0.0.1:0").await?);
        let local_addr = socket.local_addr()?;
        let queries = Arc::new(AtomicUsize::new(0));

        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();
        let counter = Arc::clone(&queries);

        tokio::spawn(async move {
            let mut buf = vec![0u8; 512];

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => {
                        break;
                    }
                    result = socket.recv_from(&mut buf) => {
                        let Ok((len, peer)) = result else { continue };
                        counter.fetch_add(1, Ordering::SeqCst);

                        let (delay, replies) = behaviour.replies(&buf[..len]);
                        let socket = Arc::clone(&socket);
                        tokio::spawn(async move {
                            if !delay.is_zero() {
                                tokio::time::sleep(delay).await;
                            }
                            for reply in replies {
                                let _ = socket.send_to(&reply, peer).await;
                            }
                        });
                    }
                }
            }
        });

        Ok((
            Self {
                addr: local_addr,
                queries,
                shutdown_tx: Some(shutdown_tx),
            },
            local_addr,
        ))
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockDnsServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::wire_builders::query;

    #[tokio::test]
    async fn test_mock_server_answers_with_query_id() {
        let (server, addr) = MockDnsServer::start(MockBehaviour::answer(60)).await.unwrap();
        let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();

        let q = query(0x1234, "example.com");
        client.send_to(&q, addr).await.unwrap();

        let mut buf = vec![0u8; 512];
        let (len, _) = client.recv_from(&mut buf).await.unwrap();

        assert!(len > q.len());
        assert_eq!(buf[0..2], q[0..2]);
        assert_eq!(buf[2] & 0x80, 0x80);
        assert_eq!(server.query_count(), 1);
        server.shutdown();
    }
}
