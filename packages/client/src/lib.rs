//! Line-oriented TCP chat client library.
//!
//! This library provides the connection manager, command dispatcher and
//! interactive session used by the `tsunagi-client` binary.

pub mod command;
pub mod config;
pub mod connection;
pub mod error;
pub mod formatter;
pub mod framing;
pub mod protocol;
pub mod session;

mod ui;

pub use config::ConnectionConfig;
pub use connection::{Connection, ConnectionEvent, ConnectionState, EventReceiver};
pub use error::{ClientError, UsageError};
pub use session::run_client;
