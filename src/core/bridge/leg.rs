//! Transport seams for the two legs of a bridge session.
//!
//! The session only sees [`LegReader`] and [`LegWriter`]; the call leg is an
//! axum server-side WebSocket and the agent leg a tokio-tungstenite client
//! socket, each split into read and write halves.

use async_trait::async_trait;
use axum::extract::ws::{self as axum_ws, WebSocket};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{self, protocol::frame::coding::CloseCode};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::debug;

use super::error::{BridgeError, BridgeResult};
use super::messages::LegFrame;

/// Client socket type of the agent leg.
pub type AgentSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Close frame sent when tearing a leg down with an error indication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloseReason {
    pub code: u16,
    pub reason: &'static str,
}

impl CloseReason {
    /// 1011: the server hit a condition that prevented it from fulfilling the request
    pub const AGENT_UNAVAILABLE: CloseReason = CloseReason {
        code: 1011,
        reason: "voice agent unavailable",
    };
}

/// Read half of a leg.
#[async_trait]
pub trait LegReader: Send + 'static {
    /// Next data frame. `None` once the peer has closed the leg.
    ///
    /// Must be cancel safe: the relay loop races it against session teardown.
    async fn next_frame(&mut self) -> Option<BridgeResult<LegFrame>>;
}

/// Write half of a leg.
#[async_trait]
pub trait LegWriter: Send + 'static {
    async fn send_text(&mut self, payload: String) -> BridgeResult<()>;

    /// Close the leg, optionally telling the peer why.
    async fn close(&mut self, reason: Option<CloseReason>) -> BridgeResult<()>;
}

fn transport_error(e: impl std::fmt::Display) -> BridgeError {
    BridgeError::Transport(e.to_string())
}

// =============================================================================
// Call leg (axum server socket)
// =============================================================================

#[async_trait]
impl LegReader for SplitStream<WebSocket> {
    async fn next_frame(&mut self) -> Option<BridgeResult<LegFrame>> {
        loop {
            match self.next().await? {
                Ok(axum_ws::Message::Text(text)) => {
                    return Some(Ok(LegFrame::Text(text.as_str().to_owned())));
                }
                Ok(axum_ws::Message::Binary(data)) => return Some(Ok(LegFrame::Binary(data))),
                Ok(axum_ws::Message::Ping(_)) | Ok(axum_ws::Message::Pong(_)) => continue,
                Ok(axum_ws::Message::Close(frame)) => {
                    debug!(?frame, "Call leg sent close frame");
                    return None;
                }
                Err(e) => return Some(Err(transport_error(e))),
            }
        }
    }
}

#[async_trait]
impl LegWriter for SplitSink<WebSocket, axum_ws::Message> {
    async fn send_text(&mut self, payload: String) -> BridgeResult<()> {
        self.send(axum_ws::Message::Text(payload.into()))
            .await
            .map_err(transport_error)
    }

    async fn close(&mut self, reason: Option<CloseReason>) -> BridgeResult<()> {
        if let Some(reason) = reason {
            let frame = axum_ws::CloseFrame {
                code: reason.code,
                reason: axum_ws::Utf8Bytes::from_static(reason.reason),
            };
            self.send(axum_ws::Message::Close(Some(frame)))
                .await
                .map_err(transport_error)?;
        }
        SinkExt::close(self).await.map_err(transport_error)
    }
}

// =============================================================================
// Agent leg (tokio-tungstenite client socket)
// =============================================================================

#[async_trait]
impl LegReader for SplitStream<AgentSocket> {
    async fn next_frame(&mut self) -> Option<BridgeResult<LegFrame>> {
        loop {
            match self.next().await? {
                Ok(tungstenite::Message::Text(text)) => {
                    return Some(Ok(LegFrame::Text(text.as_str().to_owned())));
                }
                Ok(tungstenite::Message::Binary(data)) => {
                    return Some(Ok(LegFrame::Binary(data)));
                }
                Ok(tungstenite::Message::Ping(_))
                | Ok(tungstenite::Message::Pong(_))
                | Ok(tungstenite::Message::Frame(_)) => continue,
                Ok(tungstenite::Message::Close(frame)) => {
                    debug!(?frame, "Agent leg sent close frame");
                    return None;
                }
                Err(e) => return Some(Err(transport_error(e))),
            }
        }
    }
}

#[async_trait]
impl LegWriter for SplitSink<AgentSocket, tungstenite::Message> {
    async fn send_text(&mut self, payload: String) -> BridgeResult<()> {
        self.send(tungstenite::Message::Text(payload.into()))
            .await
            .map_err(transport_error)
    }

    async fn close(&mut self, reason: Option<CloseReason>) -> BridgeResult<()> {
        if let Some(reason) = reason {
            let frame = tungstenite::protocol::CloseFrame {
                code: CloseCode::from(reason.code),
                reason: tungstenite::Utf8Bytes::from_static(reason.reason),
            };
            self.send(tungstenite::Message::Close(Some(frame)))
                .await
                .map_err(transport_error)?;
        }
        SinkExt::close(self).await.map_err(transport_error)
    }
}
