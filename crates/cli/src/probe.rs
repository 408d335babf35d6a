//! `relay-dns probe`: sends A queries to a resolver and reports latencies.

use relay_dns_domain::wire::{self, QCLASS_IN, QTYPE_A};
use relay_dns_domain::UpstreamServer;
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tokio::net::UdpSocket;
use tokio::time::timeout;

pub struct ProbeArgs {
    pub server: String,
    pub count: u32,
    pub timeout_ms: u64,
    pub domains: Vec<String>,
}

#[derive(Debug, Default, Clone)]
struct ProbeStats {
    sent: u32,
    answered: u32,
    timeouts: u32,
    mismatched: u32,
    total_latency: Duration,
}

impl ProbeStats {
    fn record_answer(&mut self, latency: Duration) {
        self.sent += 1;
        self.answered += 1;
        self.total_latency += latency;
    }

    fn record_timeout(&mut self) {
        self.sent += 1;
        self.timeouts += 1;
    }

    fn average_ms(&self) -> Option<f64> {
        (self.answered > 0)
            .then(|| self.total_latency.as_secs_f64() * 1000.0 / f64::from(self.answered))
    }

    fn merge(&mut self, other: &ProbeStats) {
        self.sent += other.sent;
        self.answered += other.answered;
        self.timeouts += other.timeouts;
        self.mismatched += other.mismatched;
        self.total_latency += other.total_latency;
    }
}

enum AttemptResult {
    Answered { latency: Duration, rcode: u8, answers: u16 },
    TimedOut,
}

pub async fn run(args: ProbeArgs) -> anyhow::Result<()> {
    let server: UpstreamServer = args.server.parse().map_err(anyhow::Error::msg)?;
    let server = server.socket_addr();
    let per_attempt = Duration::from_millis(args.timeout_ms.max(1));

    let bind: SocketAddr = if server.is_ipv4() {
        "0.0.0.0:0".parse()?
    } else {
        "[::]:0".parse()?
    };
    let socket = UdpSocket::bind(bind).await?;

    let mut per_domain = Vec::with_capacity(args.domains.len());

    for domain in &args.domains {
        let mut stats = ProbeStats::default();

        for attempt in 1..=args.count.max(1) {
            let id = fastrand::u16(..);
            let query = wire::encode_query(id, domain, QTYPE_A, QCLASS_IN)?;

            match send_and_wait(&socket, server, &query, id, per_attempt, &mut stats).await? {
                AttemptResult::Answered {
                    latency,
                    rcode,
                    answers,
                } => {
                    stats.record_answer(latency);
                    println!(
                        "{domain} #{attempt}: {:.2} ms rcode={rcode} answers={answers}",
                        latency.as_secs_f64() * 1000.0
                    );
                }
                AttemptResult::TimedOut => {
                    stats.record_timeout();
                    println!("{domain} #{attempt}: timed out after {} ms", args.timeout_ms);
                }
            }
        }

        per_domain.push((domain.as_str(), stats));
    }

    let overall = print_summary(server, &per_domain);

    if overall.answered == 0 {
        anyhow::bail!("no replies from {}", server);
    }
    Ok(())
}

async fn send_and_wait(
    socket: &UdpSocket,
    server: SocketAddr,
    query: &[u8],
    id: u16,
    limit: Duration,
    stats: &mut ProbeStats,
) -> anyhow::Result<AttemptResult> {
    let started = Instant::now();
    socket.send_to(query, server).await?;

    let mut buf = vec![0u8; 4096];
    let deadline = tokio::time::Instant::now() + limit;

    loop {
        let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
        let Ok(received) = timeout(remaining, socket.recv_from(&mut buf)).await else {
            return Ok(AttemptResult::TimedOut);
        };
        let (n, from) = received?;
        let reply = &buf[..n];

        // Late replies to earlier timed-out attempts land here too.
        if from != server || wire::peek_transaction_id(reply) != Some(id) || !wire::is_response(reply)
        {
            stats.mismatched += 1;
            continue;
        }

        return Ok(AttemptResult::Answered {
            latency: started.elapsed(),
            rcode: wire::response_code(reply).unwrap_or_default(),
            answers: wire::answer_count(reply).unwrap_or_default(),
        });
    }
}

fn print_summary(server: SocketAddr, per_domain: &[(&str, ProbeStats)]) -> ProbeStats {
    println!();
    println!("--- {server} probe statistics ---");

    let mut overall = ProbeStats::default();
    for (domain, stats) in per_domain {
        match stats.average_ms() {
            Some(avg) => println!(
                "{domain}: {}/{} answered, average {avg:.2} ms",
                stats.answered, stats.sent
            ),
            None => println!("{domain}: 0/{} answered", stats.sent),
        }
        overall.merge(stats);
    }

    println!(
        "{} sent, {} answered, {} timed out, {} mismatched replies ignored",
        overall.sent, overall.answered, overall.timeouts, overall.mismatched
    );
    if let Some(avg) = overall.average_ms() {
        println!("average latency {avg:.2} ms");
    }
    overall
}
