//! Connection limit middleware for the media-stream WebSocket
//!
//! Every call leg holds a bridge session and an outbound agent connection,
//! so the number of concurrent legs is capped globally and per client IP.
//!
//! ```ignore
//! let media = Router::new()
//!     .route("/media-stream", get(media_stream_handler))
//!     .layer(axum::middleware::from_fn_with_state(
//!         state.clone(),
//!         connection_limit_middleware,
//!     ));
//! ```

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::state::{AppState, ConnectionLimitError, ConnectionSlot};

/// Connection slot reserved for one upgrade request.
///
/// Lives in the request extensions, so it is released with the request when
/// the upgrade is rejected. The handler keeps a clone alive for as long as
/// the upgraded socket runs.
pub type SlotGuard = Arc<ConnectionSlot>;

fn is_websocket_upgrade(request: &Request<Body>) -> bool {
    request
        .headers()
        .get("upgrade")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.eq_ignore_ascii_case("websocket"))
        .unwrap_or(false)
}

/// Reserve a connection slot for each WebSocket upgrade.
///
/// Returns 503 when the global limit is reached and 429 when the client IP
/// is at its limit. On success a [`SlotGuard`] extension is injected; the
/// slot is freed when the last clone of it drops. Plain HTTP requests, and
/// servers started without connect info, pass through untracked.
pub async fn connection_limit_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    if !is_websocket_upgrade(&request) {
        return next.run(request).await;
    }

    let Some(client_ip) = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
    else {
        debug!("No connect info on request; connection limits not applied");
        return next.run(request).await;
    };

    match state.try_acquire_connection(client_ip) {
        Ok(()) => {
            let slot: SlotGuard =
                Arc::new(ConnectionSlot::new(state.connections.clone(), client_ip));
            request.extensions_mut().insert(slot);
            next.run(request).await
        }
        Err(ConnectionLimitError::GlobalLimitReached) => {
            warn!(ip = %client_ip, "Rejecting call leg: global limit reached");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "Server at capacity. Please try again later.",
            )
                .into_response()
        }
        Err(ConnectionLimitError::PerIpLimitReached) => {
            warn!(ip = %client_ip, "Rejecting call leg: per-IP limit reached");
            (
                StatusCode::TOO_MANY_REQUESTS,
                "Too many connections from your IP address.",
            )
                .into_response()
        }
    }
}
