//! Client for sending queries to a running server

use crate::server::protocol::Verdict;
use crate::server::transport::TlsConnector;
use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::time::Duration;
use thiserror::Error;

/// Read/write timeout
const IO_TIMEOUT: Duration = Duration::from_secs(30);

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in client operations
#[derive(Debug, Error)]
pub enum ClientError {
    /// Communication error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Handshake or record-layer failure: untrusted certificate, name
    /// mismatch, or a peer that does not speak TLS
    #[error("TLS error: {0}")]
    Tls(io::Error),

    /// The server answered with something that is not a verdict
    #[error("Invalid response from server: {0:?}")]
    InvalidResponse(String),
}

/// Sends one query per connection
#[derive(Clone)]
pub struct QueryClient {
    host: String,
    port: u16,
    tls: Option<TlsConnector>,
    timeout: Duration,
}

impl QueryClient {
    /// Client for a plain-TCP server
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            tls: None,
            timeout: IO_TIMEOUT,
        }
    }

    /// Use TLS; the server certificate is verified by `connector`
    pub fn with_tls(mut self, connector: TlsConnector) -> Self {
        self.tls = Some(connector);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Ask whether `query` exists
    pub fn query(&self, query: &str) -> ClientResult<Verdict> {
        let response = self.send_raw(query.as_bytes())?;
        Verdict::parse(&response).ok_or(ClientError::InvalidResponse(response))
    }

    /// Send raw bytes and return the server's response text
    pub fn send_raw(&self, payload: &[u8]) -> ClientResult<String> {
        let tcp = TcpStream::connect((self.host.as_str(), self.port))?;
        tcp.set_read_timeout(Some(self.timeout))?;
        tcp.set_write_timeout(Some(self.timeout))?;

        let response = match &self.tls {
            None => exchange_plain(tcp, payload)?,
            Some(connector) => self.exchange_tls(connector, tcp, payload)?,
        };
        Ok(response)
    }

    #[cfg(feature = "tls")]
    fn exchange_tls(
        &self,
        connector: &TlsConnector,
        tcp: TcpStream,
        payload: &[u8],
    ) -> ClientResult<String> {
        let mut stream = connector.connect(&self.host, tcp).map_err(tls_error)?;
        stream.write_all(payload).map_err(tls_error)?;
        // close_notify is the TLS end-of-request, as the half-close is for TCP
        stream.conn.send_close_notify();
        stream.flush().map_err(tls_error)?;
        read_response(&mut stream).map_err(tls_error)
    }

    #[cfg(not(feature = "tls"))]
    fn exchange_tls(
        &self,
        connector: &TlsConnector,
        _tcp: TcpStream,
        _payload: &[u8],
    ) -> ClientResult<String> {
        match *connector {}
    }
}

/// Separate TLS protocol failures from plain socket errors
#[cfg(feature = "tls")]
fn tls_error(e: io::Error) -> ClientError {
    let is_tls = e.get_ref().is_some_and(|inner| {
        inner.is::<rustls::Error>() || inner.is::<rustls::pki_types::InvalidDnsNameError>()
    });
    if is_tls {
        ClientError::Tls(e)
    } else {
        ClientError::Io(e)
    }
}

fn exchange_plain(mut tcp: TcpStream, payload: &[u8]) -> io::Result<String> {
    tcp.write_all(payload)?;
    tcp.flush()?;
    // Half-close so an empty payload still reaches the server as end-of-request
    tcp.shutdown(Shutdown::Write)?;
    read_response(&mut tcp)
}

/// Read until the server closes the connection
fn read_response<R: Read>(reader: &mut R) -> io::Result<String> {
    let mut buf = Vec::new();
    match reader.read_to_end(&mut buf) {
        Ok(_) => {}
        // Some peers close TLS without close_notify after answering
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof && !buf.is_empty() => {}
        Err(e) => return Err(e),
    }
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::thread;

    #[test]
    fn test_connect_refused() {
        // Bind then drop to get a port nothing listens on
        let port = TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let client = QueryClient::new("127.0.0.1", port);
        assert!(matches!(client.query("x"), Err(ClientError::Io(_))));
    }

    #[test]
    fn test_invalid_response() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = thread::spawn(move || {
            let (mut sock, _) = listener.accept().unwrap();
            let mut buf = [0u8; 64];
            let _ = sock.read(&mut buf).unwrap();
            sock.write_all(b"HELLO").unwrap();
        });

        let client = QueryClient::new("127.0.0.1", port);
        match client.query("x") {
            Err(ClientError::InvalidResponse(text)) => assert_eq!(text, "HELLO"),
            other => panic!("unexpected: {:?}", other.map(|v| v.to_string())),
        }
        server.join().unwrap();
    }

    #[cfg(feature = "tls")]
    #[test]
    fn test_tls_errors_are_classified() {
        let handshake = io::Error::new(io::ErrorKind::InvalidData, rustls::Error::DecryptError);
        assert!(matches!(tls_error(handshake), ClientError::Tls(_)));

        let refused = io::Error::from(io::ErrorKind::ConnectionRefused);
        assert!(matches!(tls_error(refused), ClientError::Io(_)));
    }
}
