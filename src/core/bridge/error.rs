use std::time::Duration;
use thiserror::Error;

/// Errors that end (or prevent) a bridge session.
///
/// Malformed envelopes are not represented here; they are absorbed by the
/// translators and never reach the session.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Agent WebSocket URL is missing or cannot be turned into a request
    #[error("Invalid agent URL: {0}")]
    InvalidAgentUrl(String),

    /// The agent leg refused or failed the WebSocket handshake
    #[error("Agent connection failed: {0}")]
    AgentConnectFailed(String),

    /// The agent leg did not complete the handshake in time
    #[error("Agent connection timed out after {0:?}")]
    AgentConnectTimeout(Duration),

    /// Read or write failure on an established leg
    #[error("Transport error: {0}")]
    Transport(String),
}

/// Result type for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;
