//! UI utilities for the client.

use std::io::Write;

/// Prompt shown by the line editor, e.g. `localhost:8080> `
pub fn prompt(addr: &str) -> String {
    format!("{}> ", addr)
}

/// Redisplay the prompt after asynchronous output
pub fn redisplay_prompt(prompt: &str) {
    print!("{}", prompt);
    std::io::stdout().flush().ok();
}
