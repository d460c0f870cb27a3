//! Mock provider servers
//!
//! - WebSocket voice agent (agent leg)
//!
//! The telephony REST API is mocked with `wiremock` directly in the tests.

// Not every test binary uses every mock
#![allow(dead_code)]

pub mod websocket_mock;

pub use websocket_mock::{AgentCommand, AgentConnection, MockAgent};
