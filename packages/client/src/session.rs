//! Interactive client session.

use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::mpsc;
use tsunagi_shared::time::now_local;

use crate::{
    command::Command,
    config::ConnectionConfig,
    connection::{Connection, ConnectionEvent},
    error::ClientError,
    formatter::MessageFormatter,
    ui,
};

/// Connect to the server and run the interactive session until the user
/// exits (`exit` or Ctrl+D).
///
/// Once the connection drops the session stays up: further commands are
/// reported as not connected.
///
/// Only a failed connect is returned as an error; everything after that is
/// reported on the console.
pub async fn run_client(config: ConnectionConfig) -> Result<(), ClientError> {
    let mut connection = Connection::new(config);
    let mut events = connection.connect().await?;

    let addr = connection.config().addr();
    let prompt = ui::prompt(&addr);
    print!("{}", MessageFormatter::format_connected(&addr));

    // Create channel for rustyline input
    let (input_tx, mut input_rx) = mpsc::unbounded_channel::<String>();

    // Spawn a blocking thread for rustyline (synchronous readline)
    let prompt_for_readline = prompt.clone();
    let _readline_handle = std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                tracing::error!("Failed to initialize readline: {}", e);
                return;
            }
        };

        loop {
            match rl.readline(&prompt_for_readline) {
                Ok(line) => {
                    if !is_blank(&line) {
                        rl.add_history_entry(line.as_str()).ok();
                        if input_tx.send(line).is_err() {
                            // Session ended, exit thread
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    // Ctrl+C does not quit
                    print!("{}", MessageFormatter::format_interrupt_hint());
                }
                Err(ReadlineError::Eof) => {
                    // Ctrl+D
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    // Cleared once the connection drops; input is still accepted (and
    // rejected with NotConnected) until the user exits
    let mut connected = true;

    loop {
        tokio::select! {
            event = events.recv(), if connected => match event {
                Some(ConnectionEvent::Message(text)) => {
                    print!("{}", MessageFormatter::format_received(&text, &now_local()));
                    ui::redisplay_prompt(&prompt);
                }
                Some(ConnectionEvent::PeerClosed) => {
                    print!("{}", MessageFormatter::format_peer_closed());
                    ui::redisplay_prompt(&prompt);
                    connected = false;
                }
                Some(ConnectionEvent::ReceiveFailed(e)) => {
                    print!("{}", MessageFormatter::format_receive_failed(&e));
                    ui::redisplay_prompt(&prompt);
                    connected = false;
                }
                None => connected = false,
            },
            line = input_rx.recv() => {
                // Input closed (Ctrl+D or readline failure) ends the session like `exit`
                let command = match line {
                    Some(line) => Command::parse(&line),
                    None => Ok(Command::Exit),
                };

                match command {
                    Ok(Command::Exit) => {
                        if let Err(e) = connection.exit().await {
                            tracing::debug!("Exit notification not delivered: {}", e);
                        }
                        break;
                    }
                    Ok(command) => {
                        if let Err(e) = command.dispatch(&mut connection).await {
                            print!("{}", MessageFormatter::format_error(&e));
                        }
                    }
                    Err(usage) => print!("{}", MessageFormatter::format_usage(&usage)),
                }
            }
        }
    }

    connection.disconnect().await;
    tracing::info!("Client session ended");

    Ok(())
}

/// Whitespace-only input is not sent; anything else goes out unchanged
fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}
