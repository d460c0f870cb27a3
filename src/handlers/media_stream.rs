//! Media stream WebSocket handler
//!
//! The telephony provider connects here once the call flow tells it to
//! stream. Each accepted connection becomes one bridge session.

use axum::{
    Extension,
    extract::{
        State,
        ws::{WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures::StreamExt;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::middleware::SlotGuard;
use crate::state::AppState;

/// Maximum WebSocket frame size (1 MB)
const MAX_WS_FRAME_SIZE: usize = 1024 * 1024;

/// Maximum WebSocket message size (1 MB)
const MAX_WS_MESSAGE_SIZE: usize = 1024 * 1024;

/// Upgrade the call leg and hand it to the stream bridge.
///
/// The connection-limit slot taken by the middleware moves into the upgrade
/// callback and is released when the session ends or the upgrade fails.
pub async fn media_stream_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    slot: Option<Extension<SlotGuard>>,
) -> Response {
    let slot = slot.map(|Extension(slot)| slot);

    info!("Media stream upgrade requested");

    ws.max_frame_size(MAX_WS_FRAME_SIZE)
        .max_message_size(MAX_WS_MESSAGE_SIZE)
        .on_failed_upgrade(|e| warn!("Media stream upgrade failed: {}", e))
        .on_upgrade(move |socket| handle_media_stream(socket, state, slot))
}

async fn handle_media_stream(socket: WebSocket, state: Arc<AppState>, _slot: Option<SlotGuard>) {
    info!("Call leg connected");

    let (writer, reader) = socket.split();

    match state.bridge.bridge((reader, writer)).await {
        Ok(summary) => info!(
            session_id = %summary.session_id,
            frames_to_agent = summary.call_to_agent.stats.relayed,
            frames_to_call = summary.agent_to_call.stats.relayed,
            "Call leg finished"
        ),
        Err(e) => error!("Call leg rejected: {}", e),
    }
}
