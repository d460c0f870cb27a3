use axum::Json;
use serde_json::{Value, json};
use tracing::info;

/// Receive call status callbacks from the telephony provider.
///
/// Events are logged and acknowledged; nothing is stored.
pub async fn webhook_receiver(Json(payload): Json<Value>) -> Json<Value> {
    let event = payload
        .get("event")
        .or_else(|| payload.get("type"))
        .and_then(Value::as_str)
        .unwrap_or("unknown");
    let call_id = payload
        .get("call_id")
        .or_else(|| payload.get("data").and_then(|d| d.get("call_id")))
        .and_then(Value::as_str)
        .unwrap_or("-");

    info!(event, call_id, payload = %payload, "Webhook received");

    Json(json!({ "received": true }))
}
