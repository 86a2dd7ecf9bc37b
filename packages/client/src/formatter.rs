//! Message formatting utilities for client display.

use std::fmt::Display;

use chrono::{DateTime, TimeZone};
use tsunagi_shared::time::to_clock_time;

use crate::error::{ClientError, UsageError};

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format the banner printed once the connection is up
    pub fn format_connected(addr: &str) -> String {
        format!(
            "\nConnected to {}. Type messages and press Enter to send. Type 'exit' to quit.\n",
            addr
        )
    }

    /// Format an inbound message
    ///
    /// # Arguments
    ///
    /// * `text` - The message as received (already stripped)
    /// * `received_at` - When the message was read from the socket
    pub fn format_received<Tz>(text: &str, received_at: &DateTime<Tz>) -> String
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        format!("\n[{}] ← {}\n", to_clock_time(received_at), text)
    }

    pub fn format_peer_closed() -> String {
        "\nServer closed the connection\n".to_string()
    }

    pub fn format_receive_failed(error: &ClientError) -> String {
        format!("\n{}\n", error)
    }

    /// Format a failed send or dispatch
    pub fn format_error(error: &ClientError) -> String {
        format!("{}\n", error)
    }

    pub fn format_usage(error: &UsageError) -> String {
        format!("{}\n", error)
    }

    /// Hint printed when Ctrl+C is pressed at the prompt
    pub fn format_interrupt_hint() -> String {
        "(KeyboardInterrupt detected, type 'exit' to quit the program.)\n".to_string()
    }
}
