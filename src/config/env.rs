use std::path::PathBuf;

use super::utils::{env_var, parse_bool_env, parse_env, parse_optional_env};
use super::{
    DEFAULT_AGENT_CONNECT_TIMEOUT_SECONDS, DEFAULT_AGENT_SAMPLE_RATE, DEFAULT_CALL_TIMEOUT_SECONDS,
    DEFAULT_HOST, DEFAULT_NGROK_API_URL, DEFAULT_PORT, DEFAULT_STREAM_CHUNK_SIZE,
    DEFAULT_TELER_API_URL, ServerConfig, TlsConfig, validation,
};

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// Values from a `.env` file are visible here once `dotenvy::dotenv()` has run
    /// (done at startup in main.rs). Unset variables fall back to defaults.
    ///
    /// # Example
    /// ```rust,no_run
    /// use callbridge_gateway::config::ServerConfig;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let config = ServerConfig::from_env()?;
    /// println!("Listening on {}", config.address());
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let config = load_from_env()?;
        validation::validate_config(&config)?;
        Ok(config)
    }
}

/// Build a configuration from environment variables without validating it.
pub(super) fn load_from_env() -> Result<ServerConfig, String> {
    let tls = match (env_var("TLS_CERT_PATH"), env_var("TLS_KEY_PATH")) {
        (Some(cert), Some(key)) => Some(TlsConfig {
            cert_path: PathBuf::from(cert),
            key_path: PathBuf::from(key),
        }),
        (None, None) => None,
        _ => {
            return Err(
                "Both TLS_CERT_PATH and TLS_KEY_PATH must be set to enable TLS".to_string(),
            );
        }
    };

    Ok(ServerConfig {
        host: env_var("SERVER_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
        port: parse_env("SERVER_PORT", DEFAULT_PORT)?,
        tls,
        agent_websocket_url: env_var("ELEVENLABS_WEBSOCKET_URL").unwrap_or_default(),
        agent_sample_rate: env_var("ELEVENLABS_SAMPLE_RATE")
            .unwrap_or_else(|| DEFAULT_AGENT_SAMPLE_RATE.to_string()),
        agent_connect_timeout_seconds: parse_env(
            "AGENT_CONNECT_TIMEOUT_SECONDS",
            DEFAULT_AGENT_CONNECT_TIMEOUT_SECONDS,
        )?,
        teler_api_key: env_var("TELER_API_KEY"),
        teler_api_url: env_var("TELER_API_URL")
            .unwrap_or_else(|| DEFAULT_TELER_API_URL.to_string()),
        call_timeout_seconds: parse_env("TELER_TIMEOUT_SECONDS", DEFAULT_CALL_TIMEOUT_SECONDS)?,
        server_domain: env_var("SERVER_DOMAIN"),
        ngrok_api_url: env_var("NGROK_API_URL")
            .unwrap_or_else(|| DEFAULT_NGROK_API_URL.to_string()),
        stream_chunk_size: parse_env("STREAM_CHUNK_SIZE", DEFAULT_STREAM_CHUNK_SIZE)?,
        stream_record: parse_bool_env("STREAM_RECORD", true)?,
        log_level: env_var("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        cors_allowed_origins: env_var("CORS_ALLOWED_ORIGINS"),
        rate_limit_requests_per_second: parse_env("RATE_LIMIT_REQUESTS_PER_SECOND", 60)?,
        rate_limit_burst_size: parse_env("RATE_LIMIT_BURST_SIZE", 10)?,
        max_websocket_connections: parse_optional_env("MAX_WEBSOCKET_CONNECTIONS")?,
        max_connections_per_ip: parse_env("MAX_CONNECTIONS_PER_IP", 100)?,
    })
}
