//! WebSocket Mock Voice Agent
//!
//! Accepts agent-leg connections from the bridge. Each accepted connection is
//! handed to the test as an [`AgentConnection`], which exposes the frames the
//! bridge forwarded and lets the test push frames back or close the leg.

use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::{accept_async, tungstenite::Message};

/// What the test asks a mock connection to do
#[derive(Debug)]
pub enum AgentCommand {
    Send(String),
    Close,
}

/// One accepted agent-leg connection
pub struct AgentConnection {
    received: mpsc::UnboundedReceiver<String>,
    commands: mpsc::UnboundedSender<AgentCommand>,
    closed: Option<oneshot::Receiver<()>>,
}

impl AgentConnection {
    /// Push a text frame to the bridge
    pub fn send(&self, text: impl Into<String>) {
        self.commands
            .send(AgentCommand::Send(text.into()))
            .expect("mock agent connection is gone");
    }

    /// Close the leg from the agent side
    pub fn close(&self) {
        let _ = self.commands.send(AgentCommand::Close);
    }

    /// Next text frame the bridge forwarded, within `wait`
    pub async fn recv(&mut self, wait: Duration) -> Option<String> {
        tokio::time::timeout(wait, self.received.recv())
            .await
            .ok()
            .flatten()
    }

    /// Resolve once the socket has ended, or return false after `wait`
    pub async fn wait_closed(&mut self, wait: Duration) -> bool {
        match self.closed.take() {
            Some(closed) => tokio::time::timeout(wait, closed).await.is_ok(),
            None => true,
        }
    }
}

/// Mock voice agent server
pub struct MockAgent {
    pub addr: SocketAddr,
    connections: mpsc::UnboundedReceiver<AgentConnection>,
    accepted: Arc<AtomicUsize>,
}

impl MockAgent {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (conn_tx, conn_rx) = mpsc::unbounded_channel();
        let accepted = Arc::new(AtomicUsize::new(0));
        let counter = accepted.clone();

        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                let conn_tx = conn_tx.clone();
                tokio::spawn(async move {
                    let _ = handle_connection(stream, conn_tx).await;
                });
            }
        });

        Self {
            addr,
            connections: conn_rx,
            accepted,
        }
    }

    pub fn url(&self) -> String {
        format!("ws://{}/v1/convai/conversation", self.addr)
    }

    /// Number of TCP connections accepted so far
    pub fn accepted(&self) -> usize {
        self.accepted.load(Ordering::SeqCst)
    }

    /// Next agent-leg connection opened by the bridge
    pub async fn next_connection(&mut self, wait: Duration) -> Option<AgentConnection> {
        tokio::time::timeout(wait, self.connections.recv())
            .await
            .ok()
            .flatten()
    }
}

async fn handle_connection(
    stream: TcpStream,
    conn_tx: mpsc::UnboundedSender<AgentConnection>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let ws_stream = accept_async(stream).await?;
    let (mut write, mut read) = ws_stream.split();

    let (received_tx, received_rx) = mpsc::unbounded_channel();
    let (command_tx, mut command_rx) = mpsc::unbounded_channel();
    let (closed_tx, closed_rx) = oneshot::channel();

    let _ = conn_tx.send(AgentConnection {
        received: received_rx,
        commands: command_tx,
        closed: Some(closed_rx),
    });

    loop {
        tokio::select! {
            msg = read.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    let _ = received_tx.send(text.to_string());
                }
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
            command = command_rx.recv() => match command {
                Some(AgentCommand::Send(text)) => {
                    if write.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                Some(AgentCommand::Close) | None => {
                    let _ = write.send(Message::Close(None)).await;
                    break;
                }
            },
        }
    }

    let _ = closed_tx.send(());
    Ok(())
}
