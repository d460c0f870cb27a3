use axum::{Router, routing::post};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::handlers::webhooks::webhook_receiver;
use crate::state::AppState;

/// Telephony status callbacks, nested under `/api/v1/webhooks`.
pub fn create_webhook_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/receiver", post(webhook_receiver))
        .layer(TraceLayer::new_for_http())
}
