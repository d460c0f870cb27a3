use axum::{Router, routing::post};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::handlers::calls;
use crate::state::AppState;

/// Call setup routes, nested under `/api/v1/calls`.
pub fn create_calls_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/flow", post(calls::stream_flow))
        .route("/initiate-call", post(calls::initiate_call))
        .layer(TraceLayer::new_for_http())
}
