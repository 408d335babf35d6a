use crate::di::DnsServices;
use relay_dns_infrastructure::dns::DnsServerHandler;
use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Receive buffer; datagrams over 512 bytes still arrive whole and are then
/// dropped by the dispatcher.
const RECV_BUFFER_SIZE: usize = 4096;

const BACKOFF_INITIAL: Duration = Duration::from_millis(10);
const BACKOFF_MAX: Duration = Duration::from_secs(1);

/// Pause after consecutive hard receive errors, doubling up to [`BACKOFF_MAX`].
#[derive(Debug, Default)]
struct RecvBackoff {
    failures: u32,
}

impl RecvBackoff {
    fn next_delay(&mut self) -> Duration {
        let delay = BACKOFF_INITIAL
            .saturating_mul(1 << self.failures.min(7))
            .min(BACKOFF_MAX);
        self.failures = self.failures.saturating_add(1);
        delay
    }

    fn reset(&mut self) {
        self.failures = 0;
    }
}

/// Binds the listening socket. Failure here is fatal for the process.
pub fn bind_udp_socket(bind_addr: &str) -> anyhow::Result<Arc<UdpSocket>> {
    let socket_addr: SocketAddr = bind_addr.parse()?;
    let socket = create_udp_socket(socket_addr)?;
    Ok(Arc::new(UdpSocket::from_std(socket)?))
}

/// Runs the receive loop until `shutdown` fires.
///
/// The loop never waits on a query: every datagram is handed to the
/// dispatcher, which spawns a task for it.
pub async fn start_dns_server(
    socket: Arc<UdpSocket>,
    services: &DnsServices,
    max_concurrency: usize,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let handler = DnsServerHandler::new(
        services.handler_use_case.clone(),
        socket.clone(),
        max_concurrency,
    )
    .with_allowed_clients(services.allowed_clients.iter().copied());

    info!(
        bind_address = %socket.local_addr()?,
        max_concurrency,
        "DNS server ready"
    );

    let mut recv_buf = vec![0u8; RECV_BUFFER_SIZE];
    let mut backoff = RecvBackoff::default();

    loop {
        let received = tokio::select! {
            _ = shutdown.cancelled() => {
                info!("DNS server: shutting down");
                break;
            }
            received = socket.recv_from(&mut recv_buf) => received,
        };

        match received {
            Ok((n, from)) => {
                backoff.reset();
                let _ = handler.dispatch(recv_buf[..n].to_vec(), from);
            }
            Err(e) if is_transient(&e) => {
                warn!(error = %e, "Transient UDP receive error");
            }
            Err(e) => {
                let delay = backoff.next_delay();
                error!(
                    error = %e,
                    retry_in_ms = delay.as_millis() as u64,
                    "UDP receive error"
                );
                tokio::select! {
                    _ = shutdown.cancelled() => {
                        info!("DNS server: shutting down");
                        break;
                    }
                    _ = tokio::time::sleep(delay) => {}
                }
            }
        }
    }

    Ok(())
}

/// ICMP port-unreachable from an earlier send surfaces on some platforms as
/// a receive error on the next call.
fn is_transient(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionRefused
            | io::ErrorKind::Interrupted
            | io::ErrorKind::WouldBlock
    )
}

fn create_udp_socket(socket_addr: SocketAddr) -> anyhow::Result<std::net::UdpSocket> {
    let domain = if socket_addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;
    if socket_addr.is_ipv6() {
        socket.set_only_v6(false)?;
    }
    socket.set_reuse_address(true)?;
    socket.set_recv_buffer_size(512 * 1024)?;
    socket.set_send_buffer_size(512 * 1024)?;
    socket.bind(&socket_addr.into())?;
    socket.set_nonblocking(true)?;
    Ok(socket.into())
}
