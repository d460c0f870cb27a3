//! Wire envelopes for both legs of a bridge session.
//!
//! Inbound envelopes are decoded into closed, `type`-tagged variants before any
//! field is touched. Anything with an unrecognised `type` lands in `Unknown`;
//! anything that is not a JSON object with a string `type` (or an `audio`
//! envelope missing its payload) is an [`EnvelopeError`].
//!
//! # Call leg (telephony provider)
//!
//! ```json
//! // inbound
//! {"type": "audio", "data": {"audio_b64": "..."}}
//! // outbound
//! {"type": "audio", "audio_b64": "...", "chunk_id": 1}
//! {"type": "clear"}
//! ```
//!
//! # Agent leg (voice agent)
//!
//! ```json
//! // inbound
//! {"type": "audio", "audio_event": {"audio_base_64": "..."}}
//! {"type": "interruption"}
//! // outbound
//! {"user_audio_chunk": "..."}
//! ```

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One frame read from either leg, after transport-level control frames
/// (ping, pong, close) have been handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LegFrame {
    Text(String),
    Binary(Bytes),
}

impl LegFrame {
    /// Borrow the frame as UTF-8 text. Binary frames are accepted when they
    /// hold valid UTF-8.
    pub fn as_text(&self) -> EnvelopeResult<&str> {
        match self {
            LegFrame::Text(text) => Ok(text),
            LegFrame::Binary(data) => std::str::from_utf8(data).map_err(|_| EnvelopeError::NotUtf8),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            LegFrame::Text(text) => text.len(),
            LegFrame::Binary(data) => data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<&str> for LegFrame {
    fn from(text: &str) -> Self {
        LegFrame::Text(text.to_string())
    }
}

impl From<String> for LegFrame {
    fn from(text: String) -> Self {
        LegFrame::Text(text)
    }
}

/// Why an inbound frame could not be decoded into an envelope.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("frame is not valid UTF-8")]
    NotUtf8,

    #[error("malformed envelope: {0}")]
    Malformed(#[from] serde_json::Error),
}

pub type EnvelopeResult<T> = Result<T, EnvelopeError>;

// =============================================================================
// Call leg
// =============================================================================

/// Envelope received from the telephony provider.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type")]
pub enum CallLegEnvelope {
    #[serde(rename = "audio")]
    Audio { data: CallAudioData },

    /// start, stop, dtmf, mark and anything else the provider sends
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CallAudioData {
    pub audio_b64: String,
}

impl CallLegEnvelope {
    pub fn decode(text: &str) -> EnvelopeResult<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Command sent to the telephony provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CallLegCommand {
    /// Play one chunk of agent audio
    Audio { audio_b64: String, chunk_id: u64 },
    /// Flush anything queued for playback (barge-in)
    Clear,
}

// =============================================================================
// Agent leg
// =============================================================================

/// Envelope received from the voice agent.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type")]
pub enum AgentLegEnvelope {
    #[serde(rename = "audio")]
    Audio { audio_event: AgentAudioEvent },

    #[serde(rename = "interruption")]
    Interruption,

    /// transcripts, agent responses, pings, metadata, ...
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AgentAudioEvent {
    pub audio_base_64: String,
}

impl AgentLegEnvelope {
    pub fn decode(text: &str) -> EnvelopeResult<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Caller audio forwarded to the voice agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserAudioChunk {
    pub user_audio_chunk: String,
}
