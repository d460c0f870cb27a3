//! Bridge session: two relay loops over one call leg and one agent leg.
//!
//! Each direction runs in its own task and owns the write half of its
//! destination leg. The first loop to stop cancels the session token, the
//! sibling stops at its next suspension point, and the session then closes
//! both legs exactly once.

use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info, info_span, warn};

use super::leg::{CloseReason, LegReader, LegWriter};
use super::translator::{
    AgentToCallTranslator, CallToAgentTranslator, Direction, StreamAction, StreamTranslator,
};

/// Upper bound on each close handshake during teardown.
pub const CLOSE_TIMEOUT: Duration = Duration::from_secs(2);

/// Why a relay loop stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopExit {
    /// Source leg closed (close frame or end of stream)
    PeerClosed,
    /// Reading from the source leg failed
    ReadError(String),
    /// Writing to the destination leg failed
    WriteError(String),
    /// The sibling loop stopped first
    Cancelled,
    /// The loop task panicked
    Aborted(String),
}

/// Per-direction frame counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayStats {
    pub received: u64,
    pub relayed: u64,
    pub passed: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopReport {
    pub direction: Direction,
    pub stats: RelayStats,
    pub exit: LoopExit,
}

/// Outcome of a finished session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub session_id: String,
    pub call_to_agent: LoopReport,
    pub agent_to_call: LoopReport,
}

/// Write half of a leg that is closed at most once.
pub struct CloseOnce<W> {
    writer: W,
    closed: bool,
}

impl<W: LegWriter> CloseOnce<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            closed: false,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Close the leg. Later calls are no-ops. Errors are logged, not returned:
    /// by teardown time the peer is often already gone.
    pub async fn close(&mut self, leg: &'static str, reason: Option<CloseReason>) {
        if self.closed {
            return;
        }
        self.closed = true;

        match tokio::time::timeout(CLOSE_TIMEOUT, self.writer.close(reason)).await {
            Ok(Ok(())) => debug!(leg, "Leg closed"),
            Ok(Err(e)) => debug!(leg, "Leg close failed: {}", e),
            Err(_) => warn!(leg, "Leg close timed out after {:?}", CLOSE_TIMEOUT),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// One call leg paired with one agent leg.
///
/// Owns a fresh pair of translators, and with them the session's chunk
/// counter; nothing is shared between sessions.
pub struct BridgeSession {
    id: String,
    call_to_agent: CallToAgentTranslator,
    agent_to_call: AgentToCallTranslator,
}

impl Default for BridgeSession {
    fn default() -> Self {
        Self::new()
    }
}

impl BridgeSession {
    pub fn new() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            call_to_agent: CallToAgentTranslator::new(),
            agent_to_call: AgentToCallTranslator::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Pump both directions until either leg stops, then close both legs.
    ///
    /// `call` and `agent` are the (read, write) halves of each leg.
    pub async fn run<CR, CW, AR, AW>(self, call: (CR, CW), agent: (AR, AW)) -> SessionSummary
    where
        CR: LegReader,
        CW: LegWriter,
        AR: LegReader,
        AW: LegWriter,
    {
        let BridgeSession {
            id,
            call_to_agent,
            agent_to_call,
        } = self;
        let span = info_span!("bridge_session", session_id = %id);

        async move {
            let (call_reader, call_writer) = call;
            let (agent_reader, agent_writer) = agent;
            let cancel = CancellationToken::new();

            info!("Bridge session started");

            let upstream = tokio::spawn(
                relay_loop(call_reader, agent_writer, call_to_agent, cancel.clone())
                    .in_current_span(),
            );
            let downstream = tokio::spawn(
                relay_loop(agent_reader, call_writer, agent_to_call, cancel.clone())
                    .in_current_span(),
            );

            let (upstream, downstream) = tokio::join!(upstream, downstream);

            let (call_to_agent, agent_writer) = joined(Direction::CallToAgent, upstream);
            let (agent_to_call, call_writer) = joined(Direction::AgentToCall, downstream);

            if let Some(mut writer) = agent_writer {
                writer.close("agent", None).await;
            }
            if let Some(mut writer) = call_writer {
                writer.close("call", None).await;
            }

            info!(
                call_to_agent_relayed = call_to_agent.stats.relayed,
                agent_to_call_relayed = agent_to_call.stats.relayed,
                call_exit = ?call_to_agent.exit,
                agent_exit = ?agent_to_call.exit,
                "Bridge session ended"
            );

            SessionSummary {
                session_id: id,
                call_to_agent,
                agent_to_call,
            }
        }
        .instrument(span)
        .await
    }
}

fn joined<W>(
    direction: Direction,
    result: Result<(LoopReport, CloseOnce<W>), tokio::task::JoinError>,
) -> (LoopReport, Option<CloseOnce<W>>) {
    match result {
        Ok((report, writer)) => (report, Some(writer)),
        Err(e) => {
            error!(%direction, "Relay task failed: {}", e);
            let report = LoopReport {
                direction,
                stats: RelayStats::default(),
                exit: LoopExit::Aborted(e.to_string()),
            };
            (report, None)
        }
    }
}

/// Read from `reader`, translate, write to `writer` until the source closes,
/// a transport call fails, or the session is cancelled.
async fn relay_loop<R, W, T>(
    mut reader: R,
    writer: W,
    mut translator: T,
    cancel: CancellationToken,
) -> (LoopReport, CloseOnce<W>)
where
    R: LegReader,
    W: LegWriter,
    T: StreamTranslator,
{
    let direction = translator.direction();
    let mut writer = CloseOnce::new(writer);
    let mut stats = RelayStats::default();

    let exit = loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => break LoopExit::Cancelled,
            next = reader.next_frame() => next,
        };

        let frame = match next {
            Some(Ok(frame)) => frame,
            Some(Err(e)) => {
                warn!(%direction, "Read failed: {}", e);
                break LoopExit::ReadError(e.to_string());
            }
            None => {
                info!(%direction, "Source leg closed");
                break LoopExit::PeerClosed;
            }
        };
        stats.received += 1;

        let payload = match translator.translate(&frame) {
            StreamAction::Relay(payload) => payload,
            StreamAction::Mutate(payload) => {
                debug!(%direction, "Forwarding mutated frame");
                payload
            }
            StreamAction::Pass => {
                stats.passed += 1;
                continue;
            }
        };

        let written = tokio::select! {
            biased;
            _ = cancel.cancelled() => break LoopExit::Cancelled,
            written = writer.writer.send_text(payload) => written,
        };
        if let Err(e) = written {
            warn!(%direction, "Write failed: {}", e);
            break LoopExit::WriteError(e.to_string());
        }
        stats.relayed += 1;
    };

    cancel.cancel();
    debug!(%direction, ?exit, ?stats, "Relay loop stopped");

    (
        LoopReport {
            direction,
            stats,
            exit,
        },
        writer,
    )
}
