//! HTTP and WebSocket request handlers
//!
//! - `api` - Health check endpoint
//! - `calls` - Call flow descriptor and outbound call initiation
//! - `media_stream` - Call leg WebSocket, bridged to the voice agent
//! - `webhooks` - Telephony status callbacks

pub mod api;
pub mod calls;
pub mod media_stream;
pub mod webhooks;

pub use media_stream::media_stream_handler;
