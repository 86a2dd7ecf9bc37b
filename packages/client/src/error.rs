//! Error types for the chat client.

use std::io;

use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// Socket creation or connect failed (including connect timeout)
    #[error("Failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// `connect` was called on a live connection
    #[error("Already connected to {0}")]
    AlreadyConnected(String),

    /// `send` was called without an open socket
    #[error("Not connected to server")]
    NotConnected,

    /// Write to the socket failed
    #[error("Failed to send message: {0}")]
    Send(#[source] io::Error),

    /// Read from the socket failed while the connection was running
    #[error("Error receiving message: {0}")]
    Receive(#[source] io::Error),
}

/// Malformed privileged command typed by the user
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UsageError {
    /// `@login_as_admin` with the wrong number of arguments
    #[error("Usage: @login_as_admin username password session_id")]
    LoginAsAdmin,
}
