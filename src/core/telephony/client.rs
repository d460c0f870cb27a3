//! REST client for outbound call initiation.

use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};
use zeroize::Zeroize;

const CREATE_CALL_PATH: &str = "/v1/calls/initiate";
const API_KEY_HEADER: &str = "X-API-KEY";

/// Errors returned by the telephony REST client.
#[derive(Debug, Error)]
pub enum TelephonyError {
    #[error("Telephony API key is not configured")]
    MissingApiKey,

    #[error("Telephony request failed: {0}")]
    Request(String),

    #[error("Telephony request timed out")]
    Timeout,

    #[error("Telephony provider returned {status}: {body}")]
    Provider { status: u16, body: String },

    #[error("Invalid telephony response: {0}")]
    InvalidResponse(String),
}

pub type TelephonyResult<T> = Result<T, TelephonyError>;

impl From<reqwest::Error> for TelephonyError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TelephonyError::Timeout
        } else {
            TelephonyError::Request(e.to_string())
        }
    }
}

/// Outbound call parameters sent to the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateCallRequest {
    pub from_number: String,
    pub to_number: String,
    pub flow_url: String,
    pub status_callback_url: String,
    pub record: bool,
}

/// Client for the telephony provider's REST API.
pub struct TelerClient {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl std::fmt::Debug for TelerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelerClient")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Drop for TelerClient {
    fn drop(&mut self) {
        if let Some(ref mut key) = self.api_key {
            key.zeroize();
        }
    }
}

impl TelerClient {
    /// Build a client whose every request is bounded by `timeout`.
    ///
    /// A missing or blank API key is accepted here and reported by
    /// [`TelerClient::create_call`], so the server can still start.
    pub fn new(
        api_key: Option<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> TelephonyResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TelephonyError::Request(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Ask the provider to place a call. Returns the provider's call id.
    pub async fn create_call(&self, request: &CreateCallRequest) -> TelephonyResult<String> {
        let api_key = self.api_key.as_deref().ok_or(TelephonyError::MissingApiKey)?;
        let url = format!("{}{}", self.base_url, CREATE_CALL_PATH);

        debug!(to = %request.to_number, "Requesting outbound call");

        let response = self
            .http
            .post(&url)
            .header(API_KEY_HEADER, api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TelephonyError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| TelephonyError::InvalidResponse(e.to_string()))?;

        let call_id = extract_call_id(&body).ok_or_else(|| {
            TelephonyError::InvalidResponse("response does not contain a call id".to_string())
        })?;

        info!(call_id = %call_id, "Call created");
        Ok(call_id)
    }
}

/// Read `id` or `call_id`, at the top level or nested under `data`.
fn extract_call_id(body: &Value) -> Option<String> {
    fn id_field(obj: &Value) -> Option<String> {
        ["id", "call_id"]
            .iter()
            .filter_map(|key| obj.get(key))
            .find_map(|value| match value {
                Value::String(s) if !s.is_empty() => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
    }

    id_field(body).or_else(|| body.get("data").and_then(id_field))
}
