use std::path::PathBuf;

use super::yaml::{TlsYaml, YamlConfig};
use super::{ServerConfig, TlsConfig, env};

/// Merge environment configuration (base) with YAML overrides.
///
/// Every YAML value that is present replaces the environment value; anything
/// the YAML file leaves out keeps the environment value or the default.
pub(super) fn merge_config(
    yaml: Option<YamlConfig>,
) -> Result<ServerConfig, Box<dyn std::error::Error>> {
    let mut config = env::load_from_env()?;

    let Some(yaml) = yaml else {
        return Ok(config);
    };

    if let Some(server) = yaml.server {
        if let Some(host) = server.host {
            config.host = host;
        }
        if let Some(port) = server.port {
            config.port = port;
        }
        if let Some(tls) = server.tls {
            config.tls = merge_tls(tls, config.tls.take())?;
        }
    }

    if let Some(agent) = yaml.agent {
        if let Some(url) = agent.websocket_url {
            config.agent_websocket_url = url;
        }
        if let Some(rate) = agent.sample_rate {
            config.agent_sample_rate = rate;
        }
        if let Some(timeout) = agent.connect_timeout_seconds {
            config.agent_connect_timeout_seconds = timeout;
        }
    }

    if let Some(telephony) = yaml.telephony {
        if let Some(key) = telephony.api_key {
            config.teler_api_key = Some(key);
        }
        if let Some(url) = telephony.api_url {
            config.teler_api_url = url;
        }
        if let Some(timeout) = telephony.timeout_seconds {
            config.call_timeout_seconds = timeout;
        }
        if let Some(domain) = telephony.server_domain {
            config.server_domain = Some(domain);
        }
        if let Some(url) = telephony.ngrok_api_url {
            config.ngrok_api_url = url;
        }
    }

    if let Some(stream) = yaml.stream {
        if let Some(chunk_size) = stream.chunk_size {
            config.stream_chunk_size = chunk_size;
        }
        if let Some(record) = stream.record {
            config.stream_record = record;
        }
    }

    if let Some(level) = yaml.logging.and_then(|l| l.level) {
        config.log_level = level;
    }

    if let Some(security) = yaml.security {
        if let Some(origins) = security.cors_allowed_origins {
            config.cors_allowed_origins = Some(origins);
        }
        if let Some(rps) = security.rate_limit_requests_per_second {
            config.rate_limit_requests_per_second = rps;
        }
        if let Some(burst) = security.rate_limit_burst_size {
            config.rate_limit_burst_size = burst;
        }
        if let Some(max) = security.max_websocket_connections {
            config.max_websocket_connections = Some(max);
        }
        if let Some(per_ip) = security.max_connections_per_ip {
            config.max_connections_per_ip = per_ip;
        }
    }

    Ok(config)
}

fn merge_tls(yaml: TlsYaml, env_tls: Option<TlsConfig>) -> Result<Option<TlsConfig>, String> {
    if yaml.enabled == Some(false) {
        return Ok(None);
    }

    match (yaml.cert_path, yaml.key_path) {
        (Some(cert), Some(key)) => Ok(Some(TlsConfig {
            cert_path: PathBuf::from(cert),
            key_path: PathBuf::from(key),
        })),
        (None, None) if yaml.enabled != Some(true) || env_tls.is_some() => Ok(env_tls),
        _ => Err("server.tls requires both cert_path and key_path".to_string()),
    }
}
