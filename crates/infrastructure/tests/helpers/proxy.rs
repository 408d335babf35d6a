#![allow(dead_code)]
use relay_dns_application::ports::UpstreamResolver;
use relay_dns_application::use_cases::HandleDnsQueryUseCase;
use relay_dns_domain::UpstreamServer;
use relay_dns_infrastructure::dns::{
    AnswerCacheStore, DnsServerHandler, UpstreamRace, UpstreamRaceConfig,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::task::JoinHandle;

/// A full proxy on an ephemeral loopback port.
pub struct TestProxy {
    pub addr: SocketAddr,
    pub cache: Arc<AnswerCacheStore>,
    listener: JoinHandle<()>,
}

impl TestProxy {
    pub async fn start(upstreams: Vec<SocketAddr>) -> Self {
        let servers: Vec<UpstreamServer> = upstreams.into_iter().map(UpstreamServer::from).collect();
        let race = UpstreamRace::new(UpstreamRaceConfig::new(&servers, 500).with_ttl_bounds(60, 86_400));
        Self::start_with(Arc::new(race), |handler| handler).await
    }

    pub async fn start_with(
        resolver: Arc<dyn UpstreamResolver>,
        configure: impl FnOnce(DnsServerHandler) -> DnsServerHandler,
    ) -> Self {
        let cache = Arc::new(AnswerCacheStore::new(1_000));
        let use_case = Arc::new(HandleDnsQueryUseCase::new(cache.clone(), resolver));

        let socket = Arc::new(UdpSocket::bind("127.0.0.1:0").await.unwrap());
        let addr = socket.local_addr().unwrap();
        let handler = configure(DnsServerHandler::new(use_case, Arc::clone(&socket), 8));

        let listener = tokio::spawn(async move {
            let mut buf = vec![0u8; 4096];
            loop {
                let Ok((len, peer)) = socket.recv_from(&mut buf).await else {
                    continue;
                };
                handler.dispatch(buf[..len].to_vec(), peer);
            }
        });

        Self {
            addr,
            cache,
            listener,
        }
    }

    /// Sends one datagram from a fresh client socket and waits briefly for a reply.
    pub async fn ask(&self, datagram: &[u8]) -> Option<Vec<u8>> {
        let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        client.send_to(datagram, self.addr).await.unwrap();

        let mut buf = vec![0u8; 4096];
        match tokio::time::timeout(Duration::from_millis(1_000), client.recv_from(&mut buf)).await {
            Ok(Ok((len, from))) => {
                assert_eq!(from, self.addr);
                Some(buf[..len].to_vec())
            }
            _ => None,
        }
    }
}

impl Drop for TestProxy {
    fn drop(&mut self) {
        self.listener.abort();
    }
}
