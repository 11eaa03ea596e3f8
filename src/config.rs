//! Server configuration
//!
//! Loaded from a JSON file; every key has a default except `dataset_path`.
//! Relative paths in the file are resolved against the file's directory.
//!
//! ```json
//! {
//!   "host": "0.0.0.0",
//!   "port": 8443,
//!   "dataset_path": "data/200k.txt",
//!   "reread_on_query": false,
//!   "tls": { "enabled": true, "certificate": "security/server.crt", "private_key": "security/server.key" }
//! }
//! ```

use crate::search::StrategyKind;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port (0 picks an ephemeral port)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Largest request accepted, in bytes
    #[serde(default = "default_max_payload")]
    pub max_payload: usize,

    /// File whose lines are searched
    #[serde(default)]
    pub dataset_path: PathBuf,

    /// Reload the dataset on every query instead of caching it
    #[serde(default)]
    pub reread_on_query: bool,

    /// Search strategy used to resolve queries
    #[serde(default)]
    pub strategy: StrategyKind,

    /// Verbose logging
    #[serde(default)]
    pub debug: bool,

    /// Append logs to this file instead of stderr
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// Worker threads; 0 uses the number of CPUs
    #[serde(default)]
    pub workers: usize,

    /// Accepted connections allowed to wait for a worker
    #[serde(default = "default_queue_depth")]
    pub queue_depth: usize,

    /// Per-connection read/write timeout in seconds; 0 disables it
    #[serde(default = "default_io_timeout_secs")]
    pub io_timeout_secs: u64,

    #[serde(default)]
    pub tls: TlsConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TlsConfig {
    #[serde(default)]
    pub enabled: bool,
    /// PEM certificate chain
    #[serde(default)]
    pub certificate: PathBuf,
    /// PEM private key
    #[serde(default)]
    pub private_key: PathBuf,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_payload() -> usize {
    1024
}

fn default_queue_depth() -> usize {
    64
}

fn default_io_timeout_secs() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_payload: default_max_payload(),
            dataset_path: PathBuf::new(),
            reread_on_query: false,
            strategy: StrategyKind::default(),
            debug: false,
            log_file: None,
            workers: 0,
            queue_depth: default_queue_depth(),
            io_timeout_secs: default_io_timeout_secs(),
            tls: TlsConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Read a config file and resolve its relative paths.
    ///
    /// Not validated here: callers apply command-line overrides first and
    /// then call [`ServerConfig::validate`].
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let mut config: ServerConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    /// Make relative file paths relative to `base`
    pub fn resolve_paths(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if !p.as_os_str().is_empty() && p.is_relative() {
                *p = base.join(&*p);
            }
        };
        resolve(&mut self.dataset_path);
        resolve(&mut self.tls.certificate);
        resolve(&mut self.tls.private_key);
        if let Some(log_file) = self.log_file.as_mut() {
            resolve(log_file);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.dataset_path.as_os_str().is_empty() {
            anyhow::bail!("dataset_path must be set");
        }
        if self.max_payload == 0 {
            anyhow::bail!("max_payload must be > 0");
        }
        if self.queue_depth == 0 {
            anyhow::bail!("queue_depth must be > 0");
        }
        if self.tls.enabled
            && (self.tls.certificate.as_os_str().is_empty()
                || self.tls.private_key.as_os_str().is_empty())
        {
            anyhow::bail!("tls.certificate and tls.private_key are required when tls.enabled is true");
        }
        Ok(())
    }

    /// Worker count with 0 resolved to the CPU count
    pub fn effective_workers(&self) -> usize {
        if self.workers == 0 {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        } else {
            self.workers
        }
    }

    pub fn io_timeout(&self) -> Option<Duration> {
        (self.io_timeout_secs > 0).then(|| Duration::from_secs(self.io_timeout_secs))
    }
}
