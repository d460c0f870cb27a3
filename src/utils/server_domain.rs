//! Public domain discovery.
//!
//! The telephony provider must reach this server over the public internet.
//! In development that usually means an ngrok tunnel, so when no domain is
//! configured the local ngrok agent API is asked for its https tunnel.

use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::ServerConfig;

const NGROK_DISCOVERY_TIMEOUT: Duration = Duration::from_secs(3);

/// Why the ngrok agent could not supply a public domain.
#[derive(Debug, Error)]
pub enum DomainDiscoveryError {
    #[error("Failed to create HTTP client: {0}")]
    Client(String),

    #[error("ngrok API request failed: {0}")]
    Request(String),

    #[error("ngrok API returned {0}")]
    Status(u16),

    #[error("Invalid ngrok API response: {0}")]
    InvalidResponse(String),

    #[error("no https tunnel is running")]
    NoHttpsTunnel,
}

#[derive(Debug, Deserialize)]
struct TunnelList {
    #[serde(default)]
    tunnels: Vec<Tunnel>,
}

#[derive(Debug, Deserialize)]
struct Tunnel {
    public_url: String,
    #[serde(default)]
    proto: String,
}

/// Configured domain, else the ngrok tunnel domain, else `host:port`.
pub async fn resolve_server_domain(config: &ServerConfig) -> String {
    if let Some(domain) = config.server_domain.as_deref()
        && !domain.trim().is_empty()
    {
        return domain.trim().to_string();
    }

    match discover_ngrok_domain(&config.ngrok_api_url).await {
        Ok(domain) => domain,
        Err(e) => {
            let fallback = config.address();
            warn!(
                "Could not discover public domain from ngrok ({}); falling back to {}",
                e, fallback
            );
            fallback
        }
    }
}

/// Ask the ngrok agent for its first https tunnel and return the host part.
pub async fn discover_ngrok_domain(api_url: &str) -> Result<String, DomainDiscoveryError> {
    let client = reqwest::Client::builder()
        .timeout(NGROK_DISCOVERY_TIMEOUT)
        .build()
        .map_err(|e| DomainDiscoveryError::Client(e.to_string()))?;

    let url = format!("{}/api/tunnels", api_url.trim_end_matches('/'));
    debug!(url = %url, "Querying ngrok agent");

    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|e| DomainDiscoveryError::Request(e.to_string()))?;

    if !response.status().is_success() {
        return Err(DomainDiscoveryError::Status(response.status().as_u16()));
    }

    let list: TunnelList = response
        .json()
        .await
        .map_err(|e| DomainDiscoveryError::InvalidResponse(e.to_string()))?;

    list.tunnels
        .iter()
        .find(|t| t.proto == "https" || t.public_url.starts_with("https://"))
        .and_then(|t| t.public_url.strip_prefix("https://"))
        .map(|host| host.trim_end_matches('/').to_string())
        .ok_or(DomainDiscoveryError::NoHttpsTunnel)
}
