//! Per-direction message translators.
//!
//! A translator turns one inbound frame into a [`StreamAction`]. Translators
//! never fail: malformed frames are logged and passed.

use serde::Serialize;
use std::fmt;
use tracing::{debug, error, warn};

use super::messages::{
    AgentLegEnvelope, CallLegCommand, CallLegEnvelope, EnvelopeResult, LegFrame, UserAudioChunk,
};

/// What the relay loop should do with a translated frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamAction {
    /// Forward this payload to the opposite leg
    Relay(String),
    /// Frame consumed; nothing is forwarded
    Pass,
    /// Forward an edited form of the inbound frame. No translator produces
    /// this today; the relay loop forwards it like `Relay`.
    Mutate(String),
}

impl StreamAction {
    /// Payload to write to the opposite leg, if any.
    pub fn payload(&self) -> Option<&str> {
        match self {
            StreamAction::Relay(payload) | StreamAction::Mutate(payload) => Some(payload),
            StreamAction::Pass => None,
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, StreamAction::Pass)
    }
}

/// Direction of a relay loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    CallToAgent,
    AgentToCall,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::CallToAgent => write!(f, "call->agent"),
            Direction::AgentToCall => write!(f, "agent->call"),
        }
    }
}

/// Translates frames for one direction of a bridge session.
pub trait StreamTranslator: Send + 'static {
    fn direction(&self) -> Direction;

    fn translate(&mut self, frame: &LegFrame) -> StreamAction;
}

fn encode<T: Serialize>(direction: Direction, value: &T) -> Option<String> {
    match serde_json::to_string(value) {
        Ok(payload) => Some(payload),
        Err(e) => {
            error!(%direction, "Failed to serialize outbound envelope: {}", e);
            None
        }
    }
}

fn decode_frame<T>(
    direction: Direction,
    frame: &LegFrame,
    decode: impl FnOnce(&str) -> EnvelopeResult<T>,
) -> Option<T> {
    match frame.as_text().and_then(decode) {
        Ok(envelope) => Some(envelope),
        Err(e) => {
            warn!(%direction, frame_len = frame.len(), "Dropping malformed frame: {}", e);
            None
        }
    }
}

// =============================================================================
// Call -> Agent
// =============================================================================

/// Maps telephony envelopes to voice-agent envelopes. Stateless.
#[derive(Debug, Clone, Copy, Default)]
pub struct CallToAgentTranslator;

impl CallToAgentTranslator {
    pub fn new() -> Self {
        Self
    }

    /// Translate one raw call-leg message.
    pub fn translate_text(&self, text: &str) -> StreamAction {
        self.translate_frame(&LegFrame::Text(text.to_string()))
    }

    fn translate_frame(&self, frame: &LegFrame) -> StreamAction {
        let direction = Direction::CallToAgent;
        let Some(envelope) = decode_frame(direction, frame, CallLegEnvelope::decode) else {
            return StreamAction::Pass;
        };

        match envelope {
            CallLegEnvelope::Audio { data } => {
                let chunk = UserAudioChunk {
                    user_audio_chunk: data.audio_b64,
                };
                encode(direction, &chunk).map_or(StreamAction::Pass, StreamAction::Relay)
            }
            CallLegEnvelope::Unknown => StreamAction::Pass,
        }
    }
}

impl StreamTranslator for CallToAgentTranslator {
    fn direction(&self) -> Direction {
        Direction::CallToAgent
    }

    fn translate(&mut self, frame: &LegFrame) -> StreamAction {
        self.translate_frame(frame)
    }
}

// =============================================================================
// Agent -> Call
// =============================================================================

/// Sequence numbers stamped on audio chunks sent to the call leg.
///
/// Starts at 1 and advances once per chunk actually relayed, so after N relayed
/// chunks the next id is N + 1.
#[derive(Debug)]
pub struct ChunkCounter {
    next: u64,
}

impl Default for ChunkCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl ChunkCounter {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Id the next relayed chunk will carry.
    pub fn peek(&self) -> u64 {
        self.next
    }

    /// Number of chunks recorded so far.
    pub fn recorded(&self) -> u64 {
        self.next - 1
    }

    /// Record one chunk and return its id.
    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Hand the next id to `stamp`; the chunk is recorded only if it succeeds.
    pub fn record_with<T>(&mut self, stamp: impl FnOnce(u64) -> Option<T>) -> Option<T> {
        let stamped = stamp(self.next)?;
        self.next_id();
        Some(stamped)
    }
}

/// Maps voice-agent envelopes to telephony commands.
///
/// Owns the session's [`ChunkCounter`]; one instance per bridge session.
#[derive(Debug, Default)]
pub struct AgentToCallTranslator {
    chunks: ChunkCounter,
}

impl AgentToCallTranslator {
    pub fn new() -> Self {
        Self {
            chunks: ChunkCounter::new(),
        }
    }

    pub fn chunk_counter(&self) -> &ChunkCounter {
        &self.chunks
    }

    /// Translate one raw agent-leg message.
    pub fn translate_text(&mut self, text: &str) -> StreamAction {
        self.translate_frame(&LegFrame::Text(text.to_string()))
    }

    fn translate_frame(&mut self, frame: &LegFrame) -> StreamAction {
        let direction = Direction::AgentToCall;
        let Some(envelope) = decode_frame(direction, frame, AgentLegEnvelope::decode) else {
            return StreamAction::Pass;
        };

        match envelope {
            AgentLegEnvelope::Audio { audio_event } => {
                let audio_b64 = audio_event.audio_base_64;
                self.chunks
                    .record_with(|chunk_id| {
                        encode(
                            direction,
                            &CallLegCommand::Audio {
                                audio_b64,
                                chunk_id,
                            },
                        )
                    })
                    .map_or(StreamAction::Pass, StreamAction::Relay)
            }
            AgentLegEnvelope::Interruption => {
                debug!(
                    next_chunk_id = self.chunks.peek(),
                    "Agent interruption, clearing call playback"
                );
                encode(direction, &CallLegCommand::Clear)
                    .map_or(StreamAction::Pass, StreamAction::Relay)
            }
            AgentLegEnvelope::Unknown => StreamAction::Pass,
        }
    }
}

impl StreamTranslator for AgentToCallTranslator {
    fn direction(&self) -> Direction {
        Direction::AgentToCall
    }

    fn translate(&mut self, frame: &LegFrame) -> StreamAction {
        self.translate_frame(frame)
    }
}
