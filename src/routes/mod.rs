pub mod calls;
pub mod media;
pub mod webhooks;

use axum::{Router, routing::get};
use std::sync::Arc;

use crate::handlers::api::health_check;
use crate::state::AppState;

/// Assemble every route with its state applied.
///
/// Server-wide layers (CORS, rate limiting, security headers) are added by
/// the binary on top of this router.
pub fn create_app(state: Arc<AppState>) -> Router {
    let calls_routes = calls::create_calls_router().merge(media::create_media_router(state.clone()));

    Router::new()
        .route("/", get(health_check))
        .nest("/api/v1/calls", calls_routes)
        .nest("/api/v1/webhooks", webhooks::create_webhook_router())
        .with_state(state)
}
