//! Test Fixtures Module
//!
//! - Audio fixtures (programmatically generated)
//! - Wire envelopes for both legs

// Not every test binary uses every fixture
#![allow(dead_code)]

pub mod audio_fixtures;

pub use audio_fixtures::*;

use serde_json::json;

/// Call-leg audio envelope as the telephony provider sends it
pub fn call_audio(audio_b64: &str) -> String {
    json!({"type": "audio", "data": {"audio_b64": audio_b64}}).to_string()
}

/// Call-leg stream start event
pub fn call_start(stream_id: &str) -> String {
    json!({
        "type": "start",
        "stream_id": stream_id,
        "data": {"encoding": "audio/l16", "sample_rate": 8000}
    })
    .to_string()
}

/// Agent-leg audio envelope as the voice agent sends it
pub fn agent_audio(audio_b64: &str) -> String {
    json!({"type": "audio", "audio_event": {"audio_base_64": audio_b64, "event_id": 1}})
        .to_string()
}

/// Agent-leg interruption (barge-in)
pub fn agent_interruption() -> String {
    json!({"type": "interruption", "interruption_event": {"event_id": 2}}).to_string()
}

/// Agent-leg event the bridge does not forward
pub fn agent_transcript(text: &str) -> String {
    json!({"type": "user_transcript", "user_transcription_event": {"user_transcript": text}})
        .to_string()
}
