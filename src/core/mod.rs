pub mod bridge;
pub mod telephony;

// Re-export commonly used types for convenience
pub use bridge::{
    AgentConnector, BridgeError, BridgeResult, BridgeSession, SessionSummary, StreamAction,
    StreamBridge,
};

pub use telephony::{StreamFlow, TelephonyError, TelephonyResult, TelerClient};
