//! Search server
//!
//! Accepts TCP (optionally TLS) connections and answers one exact-match query
//! per connection. Connections are handed to a bounded worker pool; each
//! worker reads the request, resolves a dataset snapshot, runs the configured
//! strategy, writes a verdict, and closes the connection.

use crate::config::ServerConfig;
use crate::dataset::{DatasetError, DatasetProvider};
use crate::search::SearchStrategy;
use crate::server::pool::WorkerPool;
use crate::server::protocol::{Payload, Verdict, validate_payload};
use crate::server::stats::{PerformanceStats, Stats};
use crate::server::transport::{Connection, TlsAcceptor};
use anyhow::{Context, Result};
use std::io::{self, Read, Write};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, TcpListener, TcpStream};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Failure while handling one connection; always answered with `SERVER ERROR`
#[derive(Debug, Error)]
pub enum HandleError {
    #[error("connection I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Dataset(#[from] DatasetError),
}

/// Shared state for every connection the server handles
pub struct SearchServer {
    host: String,
    port: u16,
    provider: DatasetProvider,
    strategy: &'static dyn SearchStrategy,
    stats: Stats,
    tls: Option<TlsAcceptor>,
    max_payload: usize,
    io_timeout: Option<Duration>,
    workers: usize,
    queue_depth: usize,
    /// Connections currently inside a worker
    active: AtomicUsize,
    shutdown: AtomicBool,
}

impl SearchServer {
    /// Build the server context.
    ///
    /// Fails if TLS is enabled and the certificate or key cannot be loaded, or
    /// if the dataset cannot be loaded in cached mode.
    pub fn new(config: &ServerConfig) -> Result<Arc<Self>> {
        let tls = if config.tls.enabled {
            let acceptor =
                TlsAcceptor::from_pem_files(&config.tls.certificate, &config.tls.private_key)
                    .context("Failed to set up TLS")?;
            info!("TLS enabled");
            Some(acceptor)
        } else {
            info!("TLS is disabled");
            None
        };

        let provider = DatasetProvider::new(&config.dataset_path, config.reread_on_query)
            .context("Failed to load dataset")?;

        Ok(Self::with_provider(config, provider, tls))
    }

    /// Build the server context around an existing provider
    pub fn with_provider(
        config: &ServerConfig,
        provider: DatasetProvider,
        tls: Option<TlsAcceptor>,
    ) -> Arc<Self> {
        let strategy = config.strategy.strategy();
        if let DatasetProvider::Cached(dataset) = &provider {
            let start = Instant::now();
            strategy.prepare(dataset);
            debug!(
                "Prepared {} index in {:.2}ms",
                strategy.name(),
                start.elapsed().as_secs_f64() * 1000.0
            );
        }

        Arc::new(Self {
            host: config.host.clone(),
            port: config.port,
            provider,
            strategy,
            stats: Stats::new(),
            tls,
            max_payload: config.max_payload,
            io_timeout: config.io_timeout(),
            workers: config.effective_workers(),
            queue_depth: config.queue_depth,
            active: AtomicUsize::new(0),
            shutdown: AtomicBool::new(false),
        })
    }

    pub fn stats(&self) -> PerformanceStats {
        self.stats.snapshot()
    }

    /// Bind the listening socket
    pub fn bind(self: &Arc<Self>) -> Result<Listener> {
        let listener = TcpListener::bind((self.host.as_str(), self.port))
            .with_context(|| format!("Failed to bind to {}:{}", self.host, self.port))?;
        let local_addr = listener.local_addr()?;

        Ok(Listener {
            server: Arc::clone(self),
            listener,
            local_addr,
        })
    }

    /// Answer one request on `stream`: read, search, and write the verdict.
    ///
    /// Never fails; any error or panic becomes `SERVER ERROR`. The stream is
    /// left open for the caller to close.
    pub fn handle<S: Read + Write>(&self, stream: &mut S) -> Verdict {
        let verdict = match panic::catch_unwind(AssertUnwindSafe(|| self.process(stream))) {
            Ok(Ok(verdict)) => verdict,
            Ok(Err(e)) => {
                error!("Error handling request: {:?}", anyhow::Error::from(e));
                Verdict::ServerError
            }
            Err(_) => {
                error!("Request handler panicked");
                Verdict::ServerError
            }
        };

        let sent = stream
            .write_all(verdict.as_wire().as_bytes())
            .and_then(|_| stream.flush());
        match sent {
            Ok(()) => debug!("Response sent: {}", verdict),
            Err(e) => warn!("Failed to send response: {}", e),
        }

        verdict
    }

    fn process<S: Read>(&self, stream: &mut S) -> Result<Verdict, HandleError> {
        // One extra byte distinguishes "exactly at the limit" from "over it"
        let mut buf = vec![0u8; self.max_payload + 1];
        let n = stream.read(&mut buf)?;

        let query = match validate_payload(&buf[..n], self.max_payload) {
            Payload::Valid(query) => query,
            Payload::Empty => {
                error!("Empty payload received from client");
                return Ok(Verdict::NotExist);
            }
            Payload::Oversized { limit } => {
                error!("Invalid payload: more than {} bytes", limit);
                return Ok(Verdict::InvalidPayload(format!(
                    "payload exceeds {} bytes",
                    limit
                )));
            }
            Payload::Malformed(detail) => {
                error!("Invalid payload: {}", detail);
                return Ok(Verdict::InvalidPayload(detail));
            }
        };

        info!("Search query: {}", query);
        let dataset = self.provider.current()?;

        let start = Instant::now();
        let found = self.strategy.exists(&query, &dataset);
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
        info!("Search time: {:.2}ms", elapsed_ms);

        let stats = self.stats.record_query(elapsed_ms);
        debug!(
            total_queries = stats.total_queries,
            avg_response_ms = stats.avg_response_ms,
            max_concurrent = stats.max_concurrent,
            "Performance stats"
        );

        let verdict = Verdict::from_found(found);
        info!("{} - {}", verdict, verdict.status_tag());
        Ok(verdict)
    }

    /// Worker entry point for one accepted socket
    fn serve(&self, tcp: TcpStream, peer: SocketAddr) {
        let _active = ActiveGuard::enter(self);

        if let Some(timeout) = self.io_timeout {
            let set = tcp
                .set_read_timeout(Some(timeout))
                .and_then(|_| tcp.set_write_timeout(Some(timeout)));
            if let Err(e) = set {
                debug!("Failed to set timeouts for {}: {}", peer, e);
            }
        }

        let mut conn = match Connection::accept(tcp, self.tls.as_ref()) {
            Ok(conn) => conn,
            Err(e) => {
                warn!("TLS handshake with {} failed: {}", peer, e);
                return;
            }
        };

        self.handle(&mut conn);

        if let Err(e) = conn.close() {
            debug!("Error closing connection to {}: {}", peer, e);
        }
    }
}

/// Counts a connection as active for the lifetime of the guard
struct ActiveGuard<'a> {
    active: &'a AtomicUsize,
}

impl<'a> ActiveGuard<'a> {
    fn enter(server: &'a SearchServer) -> Self {
        let current = server.active.fetch_add(1, Ordering::SeqCst) + 1;
        let peak = server.stats.observe_concurrency(current);
        debug!("Current connections: {} (max concurrent: {})", current, peak);
        Self {
            active: &server.active,
        }
    }
}

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}

/// A bound server, ready to accept connections
pub struct Listener {
    server: Arc<SearchServer>,
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl Listener {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Handle that stops [`Listener::run`] from another thread
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            server: Arc::clone(&self.server),
            wake_addr: wake_address(self.local_addr),
        }
    }

    /// Accept connections until shut down (blocking).
    ///
    /// Queued connections are still answered before this returns.
    pub fn run(self) -> Result<()> {
        let server = self.server;
        let pool = WorkerPool::new(server.workers, server.queue_depth)
            .context("Failed to start worker pool")?;

        info!(
            "Server listening on {} ({} workers, {}, {} mode, {} search)",
            self.local_addr,
            pool.size(),
            if server.tls.is_some() { "TLS" } else { "plain TCP" },
            if server.provider.is_reread() { "reread" } else { "cached" },
            server.strategy.name(),
        );

        loop {
            let accepted = self.listener.accept();
            if server.shutdown.load(Ordering::SeqCst) {
                break;
            }

            match accepted {
                Ok((tcp, peer)) => {
                    debug!("Connection from {}", peer);
                    let worker_server = Arc::clone(&server);
                    if pool.submit(move || worker_server.serve(tcp, peer)).is_err() {
                        error!("Worker pool closed unexpectedly");
                        break;
                    }
                }
                Err(e) => {
                    error!("Accept error: {}", e);
                }
            }
        }

        pool.shutdown();

        let stats = server.stats();
        info!(
            total_queries = stats.total_queries,
            avg_response_ms = stats.avg_response_ms,
            max_concurrent = stats.max_concurrent,
            "Server stopped"
        );
        Ok(())
    }
}

/// Stops a running [`Listener`]
#[derive(Clone)]
pub struct ShutdownHandle {
    server: Arc<SearchServer>,
    wake_addr: SocketAddr,
}

impl ShutdownHandle {
    pub fn shutdown(&self) {
        self.server.shutdown.store(true, Ordering::SeqCst);
        // Unblock the pending accept()
        let _ = TcpStream::connect(self.wake_addr);
    }
}

/// Address the listener can be reached at from this host
fn wake_address(local: SocketAddr) -> SocketAddr {
    match local.ip() {
        IpAddr::V4(ip) if ip.is_unspecified() => {
            SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), local.port())
        }
        IpAddr::V6(ip) if ip.is_unspecified() => {
            SocketAddr::new(IpAddr::V6(Ipv6Addr::LOCALHOST), local.port())
        }
        _ => local,
    }
}
