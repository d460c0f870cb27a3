//! Telephony provider collaborators: the call-flow descriptor and the
//! call-initiation client.

pub mod client;
pub mod flow;

pub use client::{CreateCallRequest, TelephonyError, TelephonyResult, TelerClient};
pub use flow::{
    CallFlowRequest, FLOW_PATH, MEDIA_STREAM_PATH, StreamFlow, WEBHOOK_PATH, flow_url,
    media_stream_url, status_callback_url,
};
