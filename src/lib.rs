//! # lineseek - exact-match line search server
//!
//! lineseek answers one question over the network: is this exact string a
//! full line of the configured dataset file? Clients open a TCP (optionally
//! TLS) connection, send the query, and receive `STRING EXISTS` or
//! `STRING NOT EXIST` before the server closes the connection.
//!
//! ## Architecture
//!
//! The crate is organized into these main modules:
//!
//! - [`config`] - JSON server configuration
//! - [`dataset`] - Loading the dataset file and the cached/reread snapshot policy
//! - [`search`] - Interchangeable exact-match strategies (linear, binary, jump, exponential, set)
//! - [`server`] - Listener, worker pool, per-connection protocol, metrics, client
//! - [`output`] - Terminal formatting for the CLI
//!
//! ## Quick Start
//!
//! ```no_run
//! use lineseek::config::ServerConfig;
//! use lineseek::server::{QueryClient, SearchServer, Verdict};
//! use std::path::PathBuf;
//!
//! let config = ServerConfig {
//!     port: 0,
//!     dataset_path: PathBuf::from("data/200k.txt"),
//!     ..ServerConfig::default()
//! };
//!
//! let server = SearchServer::new(&config).unwrap();
//! let listener = server.bind().unwrap();
//! let addr = listener.local_addr();
//! std::thread::spawn(move || listener.run());
//!
//! let client = QueryClient::new("127.0.0.1", addr.port());
//! assert_eq!(client.query("20;0;11;21;0;18;3;0;").unwrap(), Verdict::Exists);
//! ```

pub mod config;
pub mod dataset;
pub mod output;
pub mod search;
pub mod server;
