use serde::{Deserialize, Serialize};

/// WebSocket path the telephony provider streams call audio to.
pub const MEDIA_STREAM_PATH: &str = "/api/v1/calls/media-stream";
/// Path the provider fetches the flow descriptor from.
pub const FLOW_PATH: &str = "/api/v1/calls/flow";
/// Path the provider posts call status events to.
pub const WEBHOOK_PATH: &str = "/api/v1/webhooks/receiver";

/// Body the provider sends when asking for a call's flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallFlowRequest {
    pub call_id: String,
    pub account_id: String,
    pub from_number: String,
    pub to_number: String,
}

/// Flow descriptor telling the provider to stream the call to us.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamFlow {
    pub action: String,
    pub ws_url: String,
    pub chunk_size: u32,
    pub sample_rate: String,
    pub record: bool,
}

impl StreamFlow {
    pub fn new(domain: &str, chunk_size: u32, sample_rate: impl Into<String>, record: bool) -> Self {
        Self {
            action: "stream".to_string(),
            ws_url: media_stream_url(domain),
            chunk_size,
            sample_rate: sample_rate.into(),
            record,
        }
    }
}

pub fn media_stream_url(domain: &str) -> String {
    format!("wss://{domain}{MEDIA_STREAM_PATH}")
}

pub fn flow_url(domain: &str) -> String {
    format!("https://{domain}{FLOW_PATH}")
}

pub fn status_callback_url(domain: &str) -> String {
    format!("https://{domain}{WEBHOOK_PATH}")
}
