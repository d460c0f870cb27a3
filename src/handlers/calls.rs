//! Call setup handlers
//!
//! - `POST /api/v1/calls/flow`: flow descriptor the telephony provider fetches
//!   when a call connects
//! - `POST /api/v1/calls/initiate-call`: place an outbound call

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

use crate::core::telephony::{
    CallFlowRequest, CreateCallRequest, StreamFlow, flow_url, status_callback_url,
};
use crate::errors::{AppError, AppResult};
use crate::state::AppState;
use crate::utils::validate_phone_number;

/// Message returned for every call-initiation failure.
const CREATE_CALL_FAILED: &str = "Failed to create call.";

#[derive(Debug, Clone, Deserialize)]
pub struct InitiateCallRequest {
    pub from_number: String,
    pub to_number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InitiateCallResponse {
    pub success: bool,
    pub call_id: String,
}

/// Return the stream flow for an incoming or outbound call.
pub async fn stream_flow(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CallFlowRequest>,
) -> Json<StreamFlow> {
    info!(
        call_id = %request.call_id,
        account_id = %request.account_id,
        "Call flow requested"
    );
    Json(state.stream_flow())
}

/// Place an outbound call through the telephony provider.
///
/// The call is pointed at this server's flow and webhook endpoints. Provider
/// failures are logged in full and reported to the client generically.
pub async fn initiate_call(
    State(state): State<Arc<AppState>>,
    Json(request): Json<InitiateCallRequest>,
) -> AppResult<Json<InitiateCallResponse>> {
    validate_phone_number(&request.from_number)
        .map_err(|e| AppError::BadRequest(format!("Invalid from_number: {e}")))?;
    validate_phone_number(&request.to_number)
        .map_err(|e| AppError::BadRequest(format!("Invalid to_number: {e}")))?;

    let domain = &state.server_domain;
    let call = CreateCallRequest {
        from_number: request.from_number,
        to_number: request.to_number,
        flow_url: flow_url(domain),
        status_callback_url: status_callback_url(domain),
        record: state.config.stream_record,
    };

    match state.telephony.create_call(&call).await {
        Ok(call_id) => {
            info!(call_id = %call_id, "Outbound call created");
            Ok(Json(InitiateCallResponse {
                success: true,
                call_id,
            }))
        }
        Err(e) => {
            error!("Failed to create call: {}", e);
            Err(AppError::Internal(CREATE_CALL_FAILED.to_string()))
        }
    }
}
