//! Network search server
//!
//! This module answers exact-match queries over TCP, optionally wrapped in TLS.
//!
//! Architecture:
//! - [`daemon`]: server context, accept loop, per-connection handling
//! - [`pool`]: bounded worker pool the accept loop hands connections to
//! - [`protocol`]: payload validation and verdict wire text
//! - [`stats`]: query count, running average latency, peak concurrency
//! - [`transport`]: plain / TLS connections
//! - [`client`]: one-query-per-connection client

pub mod client;
pub mod daemon;
pub mod pool;
pub mod protocol;
pub mod stats;
pub mod transport;

pub use client::{ClientError, QueryClient};
pub use daemon::{HandleError, Listener, SearchServer, ShutdownHandle};
pub use protocol::{Payload, Verdict};
pub use stats::PerformanceStats;
pub use transport::{TlsAcceptor, TlsConnector};
