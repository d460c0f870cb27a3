//! Stream bridge: opens the agent leg for an accepted call leg.
//!
//! A failed agent connection closes the call leg with 1011; otherwise both
//! legs are handed to a fresh [`BridgeSession`].

use futures::StreamExt;
use tracing::{error, info};

use super::connector::AgentConnector;
use super::error::BridgeResult;
use super::leg::{CloseReason, LegReader, LegWriter};
use super::session::{BridgeSession, CloseOnce, SessionSummary};

/// Entry point for a freshly accepted call leg.
///
/// Cheap to clone; holds only the agent connection settings.
#[derive(Debug, Clone)]
pub struct StreamBridge {
    connector: AgentConnector,
}

impl StreamBridge {
    pub fn new(connector: AgentConnector) -> Self {
        Self { connector }
    }

    pub fn connector(&self) -> &AgentConnector {
        &self.connector
    }

    /// Open the agent leg and relay until the session ends.
    ///
    /// If the agent leg cannot be opened, the call leg is closed with
    /// [`CloseReason::AGENT_UNAVAILABLE`] and nothing is relayed.
    pub async fn bridge<CR, CW>(&self, call: (CR, CW)) -> BridgeResult<SessionSummary>
    where
        CR: LegReader,
        CW: LegWriter,
    {
        let session = BridgeSession::new();
        let (call_reader, call_writer) = call;

        let socket = match self.connector.connect().await {
            Ok(socket) => socket,
            Err(e) => {
                error!(session_id = %session.id(), "Failed to open agent leg: {}", e);
                let mut call_writer = CloseOnce::new(call_writer);
                call_writer
                    .close("call", Some(CloseReason::AGENT_UNAVAILABLE))
                    .await;
                drop(call_reader);
                return Err(e);
            }
        };

        info!(session_id = %session.id(), "Agent leg established");
        let (agent_writer, agent_reader) = socket.split();

        Ok(session
            .run((call_reader, call_writer), (agent_reader, agent_writer))
            .await)
    }
}
