//! Bidirectional stream bridge between a telephony call leg and a voice
//! agent leg.

pub mod connector;
pub mod error;
pub mod leg;
pub mod messages;
pub mod session;
pub mod stream;
pub mod translator;

pub use connector::AgentConnector;
pub use error::{BridgeError, BridgeResult};
pub use leg::{AgentSocket, CloseReason, LegReader, LegWriter};
pub use messages::{
    AgentLegEnvelope, CallLegCommand, CallLegEnvelope, EnvelopeError, EnvelopeResult, LegFrame,
    UserAudioChunk,
};
pub use session::{
    BridgeSession, CLOSE_TIMEOUT, CloseOnce, LoopExit, LoopReport, RelayStats, SessionSummary,
};
pub use stream::StreamBridge;
pub use translator::{
    AgentToCallTranslator, CallToAgentTranslator, ChunkCounter, Direction, StreamAction,
    StreamTranslator,
};
