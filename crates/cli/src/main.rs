use clap::{Parser, Subcommand};
use relay_dns_domain::CliOverrides;
use relay_dns_jobs::{CacheSweepJob, JobRunner};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

mod bootstrap;
mod di;
mod probe;
mod server;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "relay-dns")]
#[command(version)]
#[command(about = "Relay DNS - caching DNS forwarder that races every upstream")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// DNS server port
    #[arg(short = 'd', long)]
    dns_port: Option<u16>,

    /// Bind address
    #[arg(short = 'b', long)]
    bind: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Upstream resolver; repeat to race several. Replaces the configured list.
    #[arg(long = "upstream", value_name = "ADDR")]
    upstreams: Vec<String>,

    /// Maximum queries handled concurrently
    #[arg(long)]
    max_concurrency: Option<usize>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Send A queries to a resolver and report latencies
    Probe {
        /// Resolver to query (IP, IP:PORT or [IPv6]:PORT)
        #[arg(short = 's', long, default_value = "127.0.0.1:53")]
        server: String,

        /// Queries per domain
        #[arg(short = 'n', long, default_value_t = 3)]
        count: u32,

        /// Per-query timeout in milliseconds
        #[arg(short = 't', long, default_value_t = 2000)]
        timeout_ms: u64,

        /// Domains to resolve
        #[arg(required = true)]
        domains: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(Command::Probe {
        server,
        count,
        timeout_ms,
        domains,
    }) = cli.command
    {
        return probe::run(probe::ProbeArgs {
            server,
            count,
            timeout_ms,
            domains,
        })
        .await;
    }

    let cli_overrides = CliOverrides {
        dns_port: cli.dns_port,
        bind_address: cli.bind.clone(),
        log_level: cli.log_level.clone(),
        upstream_servers: (!cli.upstreams.is_empty()).then(|| cli.upstreams.clone()),
        max_concurrency: cli.max_concurrency,
    };

    let config = bootstrap::load_config(cli.config.as_deref(), cli_overrides)?;

    bootstrap::init_logging(&config);
    bootstrap::config::log_config_summary(cli.config.as_deref(), &config);

    info!("Starting Relay DNS v{}", env!("CARGO_PKG_VERSION"));

    bootstrap::raise_fd_limit(config.server.fd_limit);

    let dns_services = di::DnsServices::new(&config)?;

    let dns_addr = config.server.listen_addr();
    let socket = server::dns::bind_udp_socket(&dns_addr).map_err(|e| {
        error!(bind_address = %dns_addr, error = %e, "Failed to bind DNS socket");
        e
    })?;

    let shutdown = CancellationToken::new();

    let sweep_job = CacheSweepJob::new(dns_services.cache_maintenance.clone())
        .with_interval(config.dns.cache_sweep_interval);
    let job_handles = JobRunner::new()
        .with_cache_sweep(sweep_job)
        .with_shutdown_token(shutdown.clone())
        .start()
        .await;

    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Shutdown signal received"),
            Err(e) => error!(error = %e, "Failed to listen for shutdown signal"),
        }
        signal_token.cancel();
    });

    server::start_dns_server(
        Arc::clone(&socket),
        &dns_services,
        config.server.max_concurrency,
        shutdown.clone(),
    )
    .await?;

    shutdown.cancel();
    for handle in job_handles {
        let _ = handle.await;
    }

    let metrics = dns_services.cache.metrics().snapshot(dns_services.cache.len());
    info!(
        entries = metrics.total_entries,
        hits = metrics.hits,
        misses = metrics.misses,
        "Server shutdown complete"
    );
    Ok(())
}
