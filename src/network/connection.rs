//! Device Connection
//!
//! Owns one socket to a device for the lifetime of one request.

use std::io::BufReader;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};

use crate::config::Config;
use crate::error::{Result, RosgateError};
use crate::protocol::{read_sentence, write_sentence, Sentence};

use super::transport::Transport;

/// Connection lifecycle
///
/// A `Connection` value only exists once `connect` has succeeded, so the
/// connecting phase is the body of [`Connection::connect`].
///
/// ```text
/// connect() → Connected → Authenticated ⇄ Executing
///                 │              │            │
///                 └──────────────┴────────────┴──→ Disconnected (error / disconnect)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
    Authenticated,
    Executing,
}

/// A single device session
pub struct Connection {
    /// Buffered transport; writes go through `get_mut`
    stream: Option<BufReader<Transport>>,

    state: ConnectionState,

    /// Peer address for logging
    peer_addr: String,

    max_word_len: u32,
}

impl Connection {
    /// Open a plain or TLS connection to `host`
    ///
    /// Connect, reads and writes are each bounded by the configured timeout.
    pub fn connect(host: &str, config: &Config) -> Result<Self> {
        let peer_addr = format!("{}:{}", host, config.port);
        tracing::debug!(
            "Connecting to {} (tls: {}, timeout: {}s)",
            peer_addr,
            config.tls,
            config.timeout().as_secs()
        );

        let tcp = open_tcp(host, config)?;
        let transport = if config.tls {
            Transport::tls(tcp, host, config.tls_verify)?
        } else {
            Transport::Plain(tcp)
        };

        tracing::debug!("Connected to {}", peer_addr);

        Ok(Self {
            stream: Some(BufReader::new(transport)),
            state: ConnectionState::Connected,
            peer_addr,
            max_word_len: config.max_word_len,
        })
    }

    /// Close the socket; safe to call more than once
    pub fn disconnect(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.get_mut().shutdown();
            tracing::debug!("Disconnected from {}", self.peer_addr);
        }
        self.state = ConnectionState::Disconnected;
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(
            self.state,
            ConnectionState::Authenticated | ConnectionState::Executing
        )
    }

    /// Whether the transport is TLS
    pub fn is_tls(&self) -> bool {
        self.stream.as_ref().is_some_and(|s| s.get_ref().is_tls())
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }

    pub(crate) fn set_state(&mut self, state: ConnectionState) {
        self.state = state;
    }

    // =========================================================================
    // Sentence I/O
    // =========================================================================

    pub(crate) fn send<T: AsRef<[u8]>>(&mut self, words: &[T]) -> Result<()> {
        let stream = self.stream.as_mut().ok_or_else(not_connected)?;
        write_sentence(stream.get_mut(), words)
    }

    pub(crate) fn receive(&mut self) -> Result<Option<Sentence>> {
        let max_word_len = self.max_word_len;
        let stream = self.stream.as_mut().ok_or_else(not_connected)?;
        read_sentence(stream, max_word_len)
    }

    /// Pass `result` through, tearing the connection down on error
    pub(crate) fn or_disconnect<T>(&mut self, result: Result<T>) -> Result<T> {
        if result.is_err() {
            self.disconnect();
        }
        result
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.disconnect();
    }
}

fn not_connected() -> RosgateError {
    RosgateError::Connection("not connected".to_string())
}

/// Try each resolved address in turn
fn open_tcp(host: &str, config: &Config) -> Result<TcpStream> {
    let timeout = config.timeout();
    let target = format!("{}:{}", host, config.port);

    let addrs: Vec<SocketAddr> = (host, config.port)
        .to_socket_addrs()
        .map_err(|e| RosgateError::Connection(format!("failed to resolve {target}: {e}")))?
        .collect();

    let mut last_err = None;
    for addr in addrs {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(tcp) => {
                tcp.set_read_timeout(Some(timeout))
                    .and_then(|_| tcp.set_write_timeout(Some(timeout)))
                    .and_then(|_| tcp.set_nodelay(true))
                    .map_err(|e| RosgateError::from_io("configuring socket", e))?;
                return Ok(tcp);
            }
            Err(e) => {
                tracing::debug!("Connect to {} failed: {}", addr, e);
                last_err = Some(e);
            }
        }
    }

    Err(match last_err {
        Some(e) => RosgateError::from_io(&format!("failed to connect to {target}"), e),
        None => RosgateError::Connection(format!("no addresses found for {target}")),
    })
}
