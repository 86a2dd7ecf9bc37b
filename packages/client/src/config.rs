//! Connection configuration.

use std::time::Duration;

use crate::framing::{Framing, MAX_LINE_LENGTH};

/// Default server host
pub const DEFAULT_HOST: &str = "localhost";

/// Default server port
pub const DEFAULT_PORT: u16 = 8080;

/// Initial capacity of the read buffer, i.e. the size of a typical socket read
pub const READ_CHUNK_SIZE: usize = 1024;

/// Settings for a single [`Connection`](crate::Connection)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound on the TCP connect; `None` keeps the platform default
    pub connect_timeout: Option<Duration>,
    pub framing: Framing,
    pub read_chunk_size: usize,
    /// Inbound lines longer than this are dropped
    pub max_line_length: usize,
}

impl ConnectionConfig {
    /// Create a config for `host:port` with default framing and chunk size
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            connect_timeout: None,
            framing: Framing::default(),
            read_chunk_size: READ_CHUNK_SIZE,
            max_line_length: MAX_LINE_LENGTH,
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn with_framing(mut self, framing: Framing) -> Self {
        self.framing = framing;
        self
    }

    /// Set the read chunk size (zero is bumped to one byte)
    pub fn with_read_chunk_size(mut self, size: usize) -> Self {
        self.read_chunk_size = size.max(1);
        self
    }

    /// Set the inbound line length limit (zero is bumped to one byte)
    pub fn with_max_line_length(mut self, length: usize) -> Self {
        self.max_line_length = length.max(1);
        self
    }

    /// `host:port`, used for logging and prompts
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PORT)
    }
}
