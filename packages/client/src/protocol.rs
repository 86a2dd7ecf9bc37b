//! Client-to-server wire vocabulary.
//!
//! Every line produced here is sent without its trailing newline; the
//! connection appends the terminator when writing.

/// Prefix of the admin login command
pub const LOGIN_AS_ADMIN: &str = "@login_as_admin";

/// Prefix of the broadcast command
pub const BROADCAST: &str = "@broadcast";

/// Prefix of the server command
pub const SERVER_COMMAND: &str = "@server-command";

/// Exit notification sent before closing the socket
pub const EXIT: &str = "@exit";

/// Line terminator appended to every outbound message
pub const LINE_TERMINATOR: char = '\n';

/// `@login_as_admin <username> <password> <session_id>`
pub fn login_as_admin_line(username: &str, password: &str, session_id: &str) -> String {
    format!("{LOGIN_AS_ADMIN} {username} {password} {session_id}")
}

/// `@broadcast <text>`
pub fn broadcast_line(text: &str) -> String {
    format!("{BROADCAST} {text}")
}

/// `@server-command <text>`
pub fn server_command_line(command: &str) -> String {
    format!("{SERVER_COMMAND} {command}")
}

/// Append the line terminator, producing the exact bytes written to the socket
pub fn terminate(line: &str) -> String {
    let mut payload = String::with_capacity(line.len() + 1);
    payload.push_str(line);
    payload.push(LINE_TERMINATOR);
    payload
}
