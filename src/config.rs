//! Configuration for device connections
//!
//! Centralized configuration with sensible defaults.

use std::time::Duration;

/// Default port of the plain-text API service
pub const DEFAULT_PORT: u16 = 8728;

/// Default connect/read/write timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Maximum accepted word length (16 MB)
pub const DEFAULT_MAX_WORD_LEN: u32 = 16 * 1024 * 1024;

/// Connection settings for one device session
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// API service port
    pub port: u16,

    /// Bound on connect and on every individual read/write (seconds)
    pub timeout_secs: u64,

    // -------------------------------------------------------------------------
    // TLS Configuration
    // -------------------------------------------------------------------------
    /// Wrap the socket in TLS (API-SSL service)
    pub tls: bool,

    /// Verify the device certificate against the webpki root store.
    /// Turning this off accepts any certificate.
    pub tls_verify: bool,

    // -------------------------------------------------------------------------
    // Protocol Configuration
    // -------------------------------------------------------------------------
    /// Largest word the reader will allocate for
    pub max_word_len: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            tls: false,
            tls_verify: true,
            max_word_len: DEFAULT_MAX_WORD_LEN,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Timeout as a `Duration`; zero is bumped to one second so sockets
    /// never block without a bound
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the API port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the connect/read/write timeout (in seconds)
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = secs;
        self
    }

    /// Enable or disable TLS
    pub fn tls(mut self, enabled: bool) -> Self {
        self.config.tls = enabled;
        self
    }

    /// Enable or disable certificate verification
    pub fn tls_verify(mut self, verify: bool) -> Self {
        self.config.tls_verify = verify;
        self
    }

    /// Set the maximum word length (in bytes)
    pub fn max_word_len(mut self, len: u32) -> Self {
        self.config.max_word_len = len;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
