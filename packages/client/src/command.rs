//! Parsing user input into chat messages and privileged commands.

use crate::{
    connection::Connection,
    error::{ClientError, UsageError},
    protocol::{self, BROADCAST, EXIT, LOGIN_AS_ADMIN, SERVER_COMMAND},
};

/// Console token that ends the session
const EXIT_TOKEN: &str = "exit";

/// One line of user input, classified
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Plain chat text, sent as-is
    Chat(String),
    LoginAsAdmin {
        username: String,
        password: String,
        session_id: String,
    },
    Broadcast(String),
    ServerCommand(String),
    Exit,
}

impl Command {
    /// Classify a line of user input.
    ///
    /// Unknown `@`-prefixed lines are plain chat. `@login_as_admin` needs
    /// exactly three arguments, otherwise a usage error is returned and
    /// nothing should be sent.
    pub fn parse(line: &str) -> Result<Self, UsageError> {
        if line.eq_ignore_ascii_case(EXIT_TOKEN) {
            return Ok(Self::Exit);
        }

        if line.starts_with(LOGIN_AS_ADMIN) {
            let parts: Vec<&str> = line.split_whitespace().collect();
            return match parts.as_slice() {
                [_, username, password, session_id] => Ok(Self::LoginAsAdmin {
                    username: username.to_string(),
                    password: password.to_string(),
                    session_id: session_id.to_string(),
                }),
                _ => Err(UsageError::LoginAsAdmin),
            };
        }

        if let Some(rest) = line.strip_prefix(BROADCAST) {
            return Ok(Self::Broadcast(argument(rest).to_string()));
        }

        if let Some(rest) = line.strip_prefix(SERVER_COMMAND) {
            return Ok(Self::ServerCommand(argument(rest).to_string()));
        }

        Ok(Self::Chat(line.to_string()))
    }

    /// The line this command puts on the wire, without the terminator
    pub fn to_wire(&self) -> String {
        match self {
            Self::Chat(text) => text.clone(),
            Self::LoginAsAdmin {
                username,
                password,
                session_id,
            } => protocol::login_as_admin_line(username, password, session_id),
            Self::Broadcast(text) => protocol::broadcast_line(text),
            Self::ServerCommand(command) => protocol::server_command_line(command),
            Self::Exit => EXIT.to_string(),
        }
    }

    /// Run this command against the connection
    pub async fn dispatch(&self, connection: &mut Connection) -> Result<(), ClientError> {
        match self {
            Self::Chat(text) => connection.send(text).await,
            Self::LoginAsAdmin {
                username,
                password,
                session_id,
            } => {
                connection
                    .login_as_admin(username, password, session_id)
                    .await
            }
            Self::Broadcast(text) => connection.broadcast_message(text).await,
            Self::ServerCommand(command) => connection.execute_server_command(command).await,
            Self::Exit => connection.exit().await,
        }
    }
}

// Drop the single space separating a command token from its argument
fn argument(rest: &str) -> &str {
    rest.strip_prefix(' ').unwrap_or(rest)
}
