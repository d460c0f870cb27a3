//! Media stream WebSocket route

use axum::{Router, middleware, routing::get};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::handlers::media_stream_handler;
use crate::middleware::connection_limit_middleware;
use crate::state::AppState;

/// Create the media stream router, nested under `/api/v1/calls`.
///
/// # Endpoint
///
/// `GET /media-stream` - WebSocket upgrade for the call leg
///
/// # Protocol
///
/// The telephony provider sends `{"type": "audio", "data": {"audio_b64": "..."}}`
/// frames (plus start/stop events, which are ignored) and receives
/// `{"type": "audio", "audio_b64": "...", "chunk_id": N}` and
/// `{"type": "clear"}` frames from the voice agent.
///
/// Guarded by the connection limit middleware.
pub fn create_media_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/media-stream", get(media_stream_handler))
        .layer(middleware::from_fn_with_state(
            state,
            connection_limit_middleware,
        ))
        .layer(TraceLayer::new_for_http())
}
