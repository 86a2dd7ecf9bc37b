//! TCP connection lifecycle and the background receive loop.
//!
//! A [`Connection`] owns one socket at a time. The read half is moved into a
//! spawned receive task that reports [`ConnectionEvent`]s over a channel; the
//! write half stays behind a mutex so the foreground flow can send. Teardown
//! can be started from either side and runs exactly once per socket.

use std::{
    future::Future,
    io,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use futures_util::StreamExt;
use tokio::{
    io::AsyncWriteExt,
    net::{
        TcpStream,
        tcp::{OwnedReadHalf, OwnedWriteHalf},
    },
    sync::{Mutex, Notify, mpsc},
    task::JoinHandle,
};
use tokio_util::codec::FramedRead;

use crate::{
    config::ConnectionConfig,
    error::ClientError,
    framing::MessageCodec,
    protocol::{self, EXIT},
};

/// How long a foreground disconnect waits for the receive task to finish
pub const JOIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Something the receive loop observed on the socket
#[derive(Debug)]
pub enum ConnectionEvent {
    /// One inbound message, trailing whitespace removed
    Message(String),
    /// The server closed the connection cleanly
    PeerClosed,
    /// A read failed while the connection was running
    ReceiveFailed(ClientError),
}

/// Receiving end of a connection's event channel
pub type EventReceiver = mpsc::UnboundedReceiver<ConnectionEvent>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

/// State shared between the foreground flow and the receive task
#[derive(Debug)]
struct Shared {
    running: AtomicBool,
    writer: Mutex<Option<OwnedWriteHalf>>,
    shutdown: Notify,
}

impl Shared {
    fn new(writer: OwnedWriteHalf) -> Self {
        Self {
            running: AtomicBool::new(true),
            writer: Mutex::new(Some(writer)),
            shutdown: Notify::new(),
        }
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Tear the socket down. Returns `true` only for the caller that
    /// actually performed the teardown.
    async fn close(&self) -> bool {
        if !self.running.swap(false, Ordering::AcqRel) {
            return false;
        }

        // notify_one keeps a permit if the receive loop is not parked yet
        self.shutdown.notify_one();

        if let Some(mut writer) = self.writer.lock().await.take()
            && let Err(e) = writer.shutdown().await
        {
            tracing::debug!("Socket shutdown failed: {}", e);
        }

        true
    }
}

/// A single logical TCP session with the chat server
#[derive(Debug)]
pub struct Connection {
    config: ConnectionConfig,
    shared: Option<Arc<Shared>>,
    receive_task: Option<JoinHandle<()>>,
    /// Set by a successful admin login; not used by protocol logic yet
    username: Option<String>,
}

impl Connection {
    pub fn new(config: ConnectionConfig) -> Self {
        Self {
            config,
            shared: None,
            receive_task: None,
            username: None,
        }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn state(&self) -> ConnectionState {
        match &self.shared {
            Some(shared) if shared.is_running() => ConnectionState::Connected,
            _ => ConnectionState::Disconnected,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Whether a receive task exists and has not finished yet
    pub fn is_receiving(&self) -> bool {
        self.receive_task
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Connect to the configured server and start the receive loop.
    ///
    /// Returns the event channel fed by the receive task. A connection that
    /// is already live is left untouched and `AlreadyConnected` is returned.
    pub async fn connect(&mut self) -> Result<EventReceiver, ClientError> {
        let addr = self.config.addr();
        if self.is_connected() {
            return Err(ClientError::AlreadyConnected(addr));
        }

        // Reap whatever is left of a previous socket before opening a new one
        self.disconnect().await;

        let stream = self
            .open_stream()
            .await
            .map_err(|source| ClientError::Connect {
                addr: addr.clone(),
                source,
            })?;

        tracing::info!("Connected to server at {}", addr);

        let (reader, writer) = stream.into_split();
        let shared = Arc::new(Shared::new(writer));
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let task = tokio::spawn(receive_loop(
            Arc::clone(&shared),
            reader,
            MessageCodec::with_max_length(self.config.framing, self.config.max_line_length),
            self.config.read_chunk_size,
            event_tx,
        ));

        self.shared = Some(shared);
        self.receive_task = Some(task);

        Ok(event_rx)
    }

    async fn open_stream(&self) -> io::Result<TcpStream> {
        let target = (self.config.host.as_str(), self.config.port);
        connect_within(self.config.connect_timeout, TcpStream::connect(target)).await
    }

    /// Close the socket and wait (bounded) for the receive task to end.
    ///
    /// Safe to call any number of times; later calls are no-ops.
    pub async fn disconnect(&mut self) {
        let Some(shared) = self.shared.take() else {
            return;
        };

        if shared.close().await {
            tracing::info!("Disconnected from server");
        }

        if let Some(task) = self.receive_task.take() {
            let abort_handle = task.abort_handle();
            match tokio::time::timeout(JOIN_TIMEOUT, task).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::debug!("Receive task ended abnormally: {}", e),
                Err(_) => {
                    tracing::warn!(
                        "Receive task did not stop within {:?}, aborting",
                        JOIN_TIMEOUT
                    );
                    abort_handle.abort();
                }
            }
        }
    }

    /// Write `line` plus a newline terminator in a single write.
    pub async fn send(&self, line: &str) -> Result<(), ClientError> {
        let Some(shared) = self.shared.as_ref().filter(|shared| shared.is_running()) else {
            tracing::warn!("Cannot send message: not connected");
            return Err(ClientError::NotConnected);
        };

        let mut writer = shared.writer.lock().await;
        let Some(writer) = writer.as_mut() else {
            tracing::warn!("Cannot send message: not connected");
            return Err(ClientError::NotConnected);
        };

        let payload = protocol::terminate(line);
        writer.write_all(payload.as_bytes()).await.map_err(|e| {
            tracing::warn!("Failed to send message: {}", e);
            ClientError::Send(e)
        })
    }

    pub async fn login_as_admin(
        &mut self,
        username: &str,
        password: &str,
        session_id: &str,
    ) -> Result<(), ClientError> {
        self.send(&protocol::login_as_admin_line(username, password, session_id))
            .await?;
        self.username = Some(username.to_string());
        Ok(())
    }

    pub async fn broadcast_message(&self, text: &str) -> Result<(), ClientError> {
        self.send(&protocol::broadcast_line(text)).await
    }

    pub async fn execute_server_command(&self, command: &str) -> Result<(), ClientError> {
        self.send(&protocol::server_command_line(command)).await
    }

    /// Send `@exit`, then disconnect whether or not the send succeeded.
    pub async fn exit(&mut self) -> Result<(), ClientError> {
        let result = self.send(EXIT).await;
        self.disconnect().await;
        result
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        if let Some(shared) = &self.shared {
            shared.running.store(false, Ordering::Release);
        }
        if let Some(task) = self.receive_task.take() {
            task.abort();
        }
    }
}

/// Bound a connect attempt by `limit`, reporting expiry as `TimedOut`
async fn connect_within<T, F>(limit: Option<Duration>, connect: F) -> io::Result<T>
where
    F: Future<Output = io::Result<T>>,
{
    let Some(limit) = limit else {
        return connect.await;
    };

    match tokio::time::timeout(limit, connect).await {
        Ok(result) => result,
        Err(_) => Err(io::Error::new(
            io::ErrorKind::TimedOut,
            format!("connect timed out after {:?}", limit),
        )),
    }
}

async fn receive_loop(
    shared: Arc<Shared>,
    reader: OwnedReadHalf,
    codec: MessageCodec,
    chunk_size: usize,
    events: mpsc::UnboundedSender<ConnectionEvent>,
) {
    let mut frames = FramedRead::with_capacity(reader, codec, chunk_size);

    while shared.is_running() {
        let next = tokio::select! {
            _ = shared.shutdown.notified() => break,
            next = frames.next() => next,
        };

        match next {
            Some(Ok(message)) => {
                events.send(ConnectionEvent::Message(message)).ok();
            }
            None => {
                // A local disconnect racing the EOF is not a peer close
                if shared.close().await {
                    tracing::info!("Server closed the connection");
                    events.send(ConnectionEvent::PeerClosed).ok();
                }
                break;
            }
            Some(Err(e)) => {
                if shared.is_running() {
                    tracing::warn!("Error receiving message: {}", e);
                    shared.close().await;
                    events
                        .send(ConnectionEvent::ReceiveFailed(ClientError::Receive(e)))
                        .ok();
                }
                break;
            }
        }
    }

    tracing::debug!("Receive loop finished");
}
