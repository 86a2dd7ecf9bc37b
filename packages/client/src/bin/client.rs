//! Line-oriented TCP chat client.
//!
//! Connects to a chat server, sends every line typed at the prompt and prints
//! whatever the server sends back. Privileged shortcuts:
//!
//! - `@login_as_admin <username> <password> <session_id>`
//! - `@broadcast <text>`
//! - `@server-command <text>`
//! - `exit` (any case) sends `@exit` and closes the connection
//!
//! Run with:
//! ```not_rust
//! cargo run --bin tsunagi-client
//! cargo run --bin tsunagi-client -- --host 10.0.0.5 --port 9000 --connect-timeout 5
//! ```

use std::time::Duration;

use clap::Parser;

use tsunagi_client::{
    ConnectionConfig,
    config::{DEFAULT_HOST, DEFAULT_PORT, READ_CHUNK_SIZE},
    framing::{Framing, MAX_LINE_LENGTH},
};
use tsunagi_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "tsunagi-client")]
#[command(about = "Line-oriented TCP chat client with admin command shortcuts", long_about = None)]
struct Args {
    /// Server host
    #[arg(short = 'H', long, default_value = DEFAULT_HOST)]
    host: String,

    /// Server port
    #[arg(short = 'p', long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Give up connecting after this many seconds (platform default if unset)
    #[arg(long, value_name = "SECS")]
    connect_timeout: Option<u64>,

    /// How inbound bytes are split into messages
    #[arg(long, value_enum, default_value_t = Framing::Lines)]
    framing: Framing,

    /// Initial read buffer size in bytes
    #[arg(long, value_name = "BYTES", default_value_t = READ_CHUNK_SIZE)]
    read_chunk_size: usize,

    /// Inbound lines longer than this many bytes are dropped
    #[arg(long, value_name = "BYTES", default_value_t = MAX_LINE_LENGTH)]
    max_line_length: usize,
}

impl From<Args> for ConnectionConfig {
    fn from(args: Args) -> Self {
        let config = ConnectionConfig::new(args.host, args.port)
            .with_framing(args.framing)
            .with_read_chunk_size(args.read_chunk_size)
            .with_max_line_length(args.max_line_length);

        match args.connect_timeout {
            Some(secs) => config.with_connect_timeout(Duration::from_secs(secs)),
            None => config,
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(&[env!("CARGO_PKG_NAME"), "tsunagi-shared"], "info");

    let args = Args::parse();

    // Run the client
    if let Err(e) = tsunagi_client::run_client(args.into()).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
