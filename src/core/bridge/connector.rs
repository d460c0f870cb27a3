use std::time::Duration;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tracing::{debug, info};

use super::error::{BridgeError, BridgeResult};
use super::leg::AgentSocket;

/// Opens the outbound agent leg for a new session.
#[derive(Debug, Clone)]
pub struct AgentConnector {
    url: String,
    timeout: Duration,
}

impl AgentConnector {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            timeout,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Perform the WebSocket handshake with the voice agent.
    ///
    /// No retries: a failed or slow handshake fails the session.
    pub async fn connect(&self) -> BridgeResult<AgentSocket> {
        if self.url.trim().is_empty() {
            return Err(BridgeError::InvalidAgentUrl(
                "agent WebSocket URL is not configured".to_string(),
            ));
        }

        let request = self
            .url
            .as_str()
            .into_client_request()
            .map_err(|e| BridgeError::InvalidAgentUrl(e.to_string()))?;

        debug!(timeout = ?self.timeout, "Connecting to voice agent");

        match tokio::time::timeout(self.timeout, connect_async(request)).await {
            Ok(Ok((socket, response))) => {
                info!(status = %response.status(), "Connected to voice agent");
                Ok(socket)
            }
            Ok(Err(e)) => Err(BridgeError::AgentConnectFailed(e.to_string())),
            Err(_) => Err(BridgeError::AgentConnectTimeout(self.timeout)),
        }
    }
}
