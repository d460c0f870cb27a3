use url::Url;

use super::ServerConfig;

/// Validate the voice agent WebSocket URL.
///
/// An empty URL is accepted at load time so the HTTP surface can still start;
/// media-stream sessions then fail to connect their agent leg.
pub fn validate_agent_url(url: &str) -> Result<(), String> {
    if url.is_empty() {
        return Ok(());
    }

    let parsed = Url::parse(url).map_err(|e| format!("Invalid agent WebSocket URL '{url}': {e}"))?;

    match parsed.scheme() {
        "ws" | "wss" => {}
        other => {
            return Err(format!(
                "Agent WebSocket URL must use ws or wss scheme, got '{other}'"
            ));
        }
    }

    if parsed.host_str().is_none() {
        return Err(format!("Agent WebSocket URL '{url}' has no host"));
    }

    Ok(())
}

fn validate_http_url(name: &str, url: &str) -> Result<(), String> {
    let parsed = Url::parse(url).map_err(|e| format!("Invalid {name} '{url}': {e}"))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(format!("{name} must use http or https scheme, got '{other}'")),
    }
}

fn validate_timeouts(config: &ServerConfig) -> Result<(), String> {
    if config.agent_connect_timeout_seconds == 0 {
        return Err("agent connect timeout must be greater than zero".to_string());
    }
    if config.call_timeout_seconds == 0 {
        return Err("telephony request timeout must be greater than zero".to_string());
    }
    Ok(())
}

fn validate_server_domain(domain: &Option<String>) -> Result<(), String> {
    if let Some(domain) = domain
        && (domain.contains("://") || domain.contains('/'))
    {
        return Err(format!(
            "SERVER_DOMAIN must be a bare host (optionally with port), got '{domain}'"
        ));
    }
    Ok(())
}

/// Run every validation rule against a fully merged configuration.
pub(super) fn validate_config(config: &ServerConfig) -> Result<(), String> {
    validate_agent_url(&config.agent_websocket_url)?;
    validate_http_url("telephony API URL", &config.teler_api_url)?;
    validate_http_url("ngrok API URL", &config.ngrok_api_url)?;
    validate_timeouts(config)?;
    validate_server_domain(&config.server_domain)?;

    if config.stream_chunk_size == 0 {
        return Err("stream chunk size must be greater than zero".to_string());
    }

    Ok(())
}
