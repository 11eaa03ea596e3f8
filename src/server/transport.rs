//! Plain and TLS-wrapped connections
//!
//! TLS is terminated with rustls (ring provider), pinned to TLS 1.2-1.3.
//! When the crate is built without the `tls` feature, [`TlsAcceptor`] and
//! [`TlsConnector`] are uninhabited and loading them fails with an error.

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::time::Duration;

/// How long `close` waits for the peer to finish sending
const DRAIN_TIMEOUT: Duration = Duration::from_secs(1);
const DRAIN_LIMIT: u64 = 64 * 1024;

#[cfg(feature = "tls")]
pub use self::tls::{TlsAcceptor, TlsConnector};

#[cfg(not(feature = "tls"))]
pub use self::noop::{TlsAcceptor, TlsConnector};

/// A server-side connection to one client
pub enum Connection {
    Plain(TcpStream),
    #[cfg(feature = "tls")]
    Tls(Box<rustls::StreamOwned<rustls::ServerConnection, TcpStream>>),
}

impl Connection {
    /// Wrap an accepted socket, running the TLS handshake when `tls` is set
    pub fn accept(stream: TcpStream, tls: Option<&TlsAcceptor>) -> io::Result<Self> {
        match tls {
            Some(acceptor) => acceptor.accept(stream),
            None => Ok(Connection::Plain(stream)),
        }
    }

    fn tcp(&self) -> &TcpStream {
        match self {
            Connection::Plain(s) => s,
            #[cfg(feature = "tls")]
            Connection::Tls(s) => &s.sock,
        }
    }

    /// Flush, send TLS close_notify if applicable, and shut the socket down.
    ///
    /// Bytes the peer sent after the request (its own close_notify, or the
    /// tail of an oversized payload) are drained first; closing with unread
    /// data would reset the connection before the peer reads the verdict.
    pub fn close(mut self) -> io::Result<()> {
        #[cfg(feature = "tls")]
        if let Connection::Tls(s) = &mut self {
            s.conn.send_close_notify();
        }
        self.flush()?;

        let tcp = self.tcp();
        match tcp.shutdown(Shutdown::Write) {
            // Peer already gone
            Err(e) if e.kind() == io::ErrorKind::NotConnected => return Ok(()),
            other => other?,
        }
        tcp.set_read_timeout(Some(DRAIN_TIMEOUT))?;
        let _ = io::copy(&mut Read::take(tcp, DRAIN_LIMIT), &mut io::sink());
        Ok(())
    }
}

impl Read for Connection {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Connection::Plain(s) => s.read(buf),
            #[cfg(feature = "tls")]
            Connection::Tls(s) => s.read(buf),
        }
    }
}

impl Write for Connection {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Connection::Plain(s) => s.write(buf),
            #[cfg(feature = "tls")]
            Connection::Tls(s) => s.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Connection::Plain(s) => s.flush(),
            #[cfg(feature = "tls")]
            Connection::Tls(s) => s.flush(),
        }
    }
}

#[cfg(feature = "tls")]
mod tls {
    use super::Connection;
    use anyhow::{Context, Result};
    use rustls::pki_types::{CertificateDer, PrivateKeyDer, ServerName};
    use rustls::{ClientConfig, ClientConnection, RootCertStore, ServerConfig, ServerConnection};
    use std::fs::File;
    use std::io::{self, BufReader};
    use std::net::TcpStream;
    use std::path::Path;
    use std::sync::Arc;

    const PROTOCOL_VERSIONS: &[&rustls::SupportedProtocolVersion] =
        &[&rustls::version::TLS12, &rustls::version::TLS13];

    fn provider() -> Arc<rustls::crypto::CryptoProvider> {
        Arc::new(rustls::crypto::ring::default_provider())
    }

    fn load_certs(path: &Path) -> Result<Vec<CertificateDer<'static>>> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open certificate {}", path.display()))?;
        let certs = rustls_pemfile::certs(&mut BufReader::new(file))
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("Failed to parse certificate {}", path.display()))?;
        if certs.is_empty() {
            anyhow::bail!("No certificates found in {}", path.display());
        }
        Ok(certs)
    }

    fn load_key(path: &Path) -> Result<PrivateKeyDer<'static>> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open private key {}", path.display()))?;
        rustls_pemfile::private_key(&mut BufReader::new(file))
            .with_context(|| format!("Failed to parse private key {}", path.display()))?
            .with_context(|| format!("No private key found in {}", path.display()))
    }

    /// Server-side TLS configuration built from a PEM certificate chain and key
    #[derive(Clone)]
    pub struct TlsAcceptor {
        config: Arc<ServerConfig>,
    }

    impl TlsAcceptor {
        pub fn from_pem_files(cert: &Path, key: &Path) -> Result<Self> {
            let config = ServerConfig::builder_with_provider(provider())
                .with_protocol_versions(PROTOCOL_VERSIONS)
                .context("Unsupported TLS protocol versions")?
                .with_no_client_auth()
                .with_single_cert(load_certs(cert)?, load_key(key)?)
                .context("Certificate and private key do not form a valid pair")?;
            Ok(Self {
                config: Arc::new(config),
            })
        }

        /// Complete the handshake on an accepted socket
        pub(crate) fn accept(&self, tcp: TcpStream) -> io::Result<Connection> {
            let conn = ServerConnection::new(Arc::clone(&self.config)).map_err(io::Error::other)?;
            let mut stream = rustls::StreamOwned::new(conn, tcp);
            while stream.conn.is_handshaking() {
                stream.conn.complete_io(&mut stream.sock)?;
            }
            Ok(Connection::Tls(Box::new(stream)))
        }
    }

    /// Client-side TLS that verifies the server against a trusted CA file
    #[derive(Clone)]
    pub struct TlsConnector {
        config: Arc<ClientConfig>,
    }

    impl TlsConnector {
        pub fn from_ca_file(ca: &Path) -> Result<Self> {
            let mut roots = RootCertStore::empty();
            for cert in load_certs(ca)? {
                roots
                    .add(cert)
                    .with_context(|| format!("Invalid CA certificate in {}", ca.display()))?;
            }
            let config = ClientConfig::builder_with_provider(provider())
                .with_protocol_versions(PROTOCOL_VERSIONS)
                .context("Unsupported TLS protocol versions")?
                .with_root_certificates(roots)
                .with_no_client_auth();
            Ok(Self {
                config: Arc::new(config),
            })
        }

        /// Open a session to `host` and finish the handshake.
        ///
        /// The handshake must be complete before the caller sends
        /// close_notify; an alert sent mid-handshake is rejected by the peer.
        pub(crate) fn connect(
            &self,
            host: &str,
            tcp: TcpStream,
        ) -> io::Result<rustls::StreamOwned<ClientConnection, TcpStream>> {
            let name = ServerName::try_from(host.to_string())
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
            let conn = ClientConnection::new(Arc::clone(&self.config), name)
                .map_err(io::Error::other)?;
            let mut stream = rustls::StreamOwned::new(conn, tcp);
            while stream.conn.is_handshaking() {
                stream.conn.complete_io(&mut stream.sock)?;
            }
            Ok(stream)
        }
    }
}

#[cfg(not(feature = "tls"))]
mod noop {
    use super::Connection;
    use anyhow::Result;
    use std::io;
    use std::net::TcpStream;
    use std::path::Path;

    /// Uninhabited: this build has no TLS support
    #[derive(Clone)]
    pub enum TlsAcceptor {}

    impl TlsAcceptor {
        pub fn from_pem_files(_cert: &Path, _key: &Path) -> Result<Self> {
            anyhow::bail!("TLS requested but lineseek was built without the `tls` feature")
        }

        pub(crate) fn accept(&self, _tcp: TcpStream) -> io::Result<Connection> {
            match *self {}
        }
    }

    /// Uninhabited: this build has no TLS support
    #[derive(Clone)]
    pub enum TlsConnector {}

    impl TlsConnector {
        pub fn from_ca_file(_ca: &Path) -> Result<Self> {
            anyhow::bail!("TLS requested but lineseek was built without the `tls` feature")
        }
    }
}

#[cfg(all(test, feature = "tls"))]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_missing_certificate_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = TlsAcceptor::from_pem_files(&dir.path().join("c.pem"), &dir.path().join("k.pem"))
            .err()
            .unwrap();
        assert!(err.to_string().contains("Failed to open certificate"));
    }

    #[test]
    fn test_certificate_without_pem_blocks_fails() {
        let dir = tempfile::tempdir().unwrap();
        let cert = dir.path().join("c.pem");
        let key = dir.path().join("k.pem");
        fs::write(&cert, "not a certificate").unwrap();
        fs::write(&key, "not a key").unwrap();

        let err = TlsAcceptor::from_pem_files(&cert, &key).err().unwrap();
        assert!(err.to_string().contains("No certificates found"));
    }

    #[test]
    fn test_missing_ca_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(TlsConnector::from_ca_file(&dir.path().join("ca.pem")).is_err());
    }
}
