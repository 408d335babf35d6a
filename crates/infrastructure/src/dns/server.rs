use futures::FutureExt;
use relay_dns_application::use_cases::HandleDnsQueryUseCase;
use rustc_hash::FxHashSet;
use std::net::{IpAddr, SocketAddr};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

/// Listener-side worker pool.
///
/// Every datagram gets its own task, but at most `max_concurrency` of them run
/// the use case at once; the rest wait for a permit. A panic inside one task
/// drops that request only.
pub struct DnsServerHandler {
    use_case: Arc<HandleDnsQueryUseCase>,
    socket: Arc<UdpSocket>,
    permits: Arc<Semaphore>,
    allowed_clients: Arc<FxHashSet<IpAddr>>,
}

impl DnsServerHandler {
    pub fn new(
        use_case: Arc<HandleDnsQueryUseCase>,
        socket: Arc<UdpSocket>,
        max_concurrency: usize,
    ) -> Self {
        Self {
            use_case,
            socket,
            permits: Arc::new(Semaphore::new(max_concurrency.max(1))),
            allowed_clients: Arc::new(FxHashSet::default()),
        }
    }

    /// Restricts service to these source IPs. Empty means everyone.
    pub fn with_allowed_clients(mut self, clients: impl IntoIterator<Item = IpAddr>) -> Self {
        self.allowed_clients = Arc::new(clients.into_iter().map(|ip| ip.to_canonical()).collect());
        self
    }

    pub fn is_allowed(&self, ip: IpAddr) -> bool {
        self.allowed_clients.is_empty() || self.allowed_clients.contains(&ip.to_canonical())
    }

    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }

    /// Schedules one datagram and returns immediately.
    ///
    /// Returns `None` when the client is not on the allowlist.
    pub fn dispatch(&self, datagram: Vec<u8>, client: SocketAddr) -> Option<JoinHandle<()>> {
        if !self.is_allowed(client.ip()) {
            debug!(client = %client, "Dropping datagram from client not on allowlist");
            return None;
        }

        let use_case = Arc::clone(&self.use_case);
        let socket = Arc::clone(&self.socket);
        let permits = Arc::clone(&self.permits);

        Some(tokio::spawn(async move {
            let Ok(_permit) = permits.acquire_owned().await else {
                return;
            };

            let outcome = AssertUnwindSafe(use_case.execute(&datagram, client))
                .catch_unwind()
                .await;

            let outcome = match outcome {
                Ok(outcome) => outcome,
                Err(_) => {
                    error!(client = %client, "Query handler panicked, request dropped");
                    return;
                }
            };

            debug!(client = %client, outcome = outcome.label(), "Query dispatched");

            if let Some(reply) = outcome.reply() {
                if let Err(e) = socket.send_to(reply, client).await {
                    warn!(client = %client, error = %e, "Failed to send reply");
                }
            }
        }))
    }
}
