//! Configuration module for the CallBridge gateway
//!
//! This module handles server configuration from various sources: .env files, YAML files,
//! and environment variables. Priority: YAML > ENV vars > .env values > defaults.
//! The configuration is split into logical submodules for maintainability.
//!
//! # Modules
//! - `yaml`: YAML configuration file loading
//! - `env`: Environment variable loading
//! - `merge`: Merging YAML and environment configurations
//! - `validation`: Configuration validation logic
//! - `utils`: Utility functions for configuration parsing
//!
//! # Example
//! ```rust,no_run
//! use callbridge_gateway::config::ServerConfig;
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load from environment variables only
//! let config = ServerConfig::from_env()?;
//!
//! // Load from YAML file with environment variable overrides
//! let config_path = PathBuf::from("config.yaml");
//! let config = ServerConfig::from_file(&config_path)?;
//!
//! println!("Server listening on {}", config.address());
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;
use std::time::Duration;

mod env;
mod merge;
mod utils;
mod validation;
mod yaml;

pub use validation::validate_agent_url;
pub use yaml::YamlConfig;

/// Default bind host
pub const DEFAULT_HOST: &str = "0.0.0.0";
/// Default bind port
pub const DEFAULT_PORT: u16 = 8000;
/// Default sample rate advertised to the telephony provider
pub const DEFAULT_AGENT_SAMPLE_RATE: &str = "16k";
/// Default agent-leg connect timeout in seconds
pub const DEFAULT_AGENT_CONNECT_TIMEOUT_SECONDS: u64 = 10;
/// Default telephony REST API base URL
pub const DEFAULT_TELER_API_URL: &str = "https://api.teler.ai";
/// Default call-initiation request timeout in seconds
pub const DEFAULT_CALL_TIMEOUT_SECONDS: u64 = 10;
/// Default local ngrok agent API
pub const DEFAULT_NGROK_API_URL: &str = "http://127.0.0.1:4040";
/// Default audio chunk size advertised in the call flow
pub const DEFAULT_STREAM_CHUNK_SIZE: u32 = 500;

/// TLS configuration for HTTPS and WSS
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsConfig {
    /// Path to the TLS certificate file (PEM format)
    pub cert_path: PathBuf,
    /// Path to the TLS private key file (PEM format)
    pub key_path: PathBuf,
}

/// Server configuration
///
/// Contains all configuration needed to run the gateway, including:
/// - Server settings (host, port, TLS)
/// - Agent leg settings (voice agent WebSocket URL, sample rate, connect timeout)
/// - Telephony settings (API key, API URL, request timeout, public domain)
/// - Call flow settings (chunk size, recording flag)
/// - Security settings (CORS, rate limiting, connection limits)
#[derive(Debug, Clone)]
pub struct ServerConfig {
    // Server settings
    pub host: String,
    pub port: u16,

    // TLS configuration (optional)
    pub tls: Option<TlsConfig>,

    // Agent leg
    /// WebSocket URL of the conversational voice agent (ws:// or wss://)
    pub agent_websocket_url: String,
    /// Sample rate string advertised in the call flow (e.g. "8k", "16k")
    pub agent_sample_rate: String,
    /// Upper bound on establishing the agent-leg connection
    pub agent_connect_timeout_seconds: u64,

    // Telephony provider
    pub teler_api_key: Option<String>,
    pub teler_api_url: String,
    /// Upper bound on the outbound call-initiation request
    pub call_timeout_seconds: u64,
    /// Public domain (no scheme) the telephony provider reaches us on.
    /// When None, it is discovered from the local ngrok agent at startup.
    pub server_domain: Option<String>,
    pub ngrok_api_url: String,

    // Call flow
    pub stream_chunk_size: u32,
    pub stream_record: bool,

    // Logging
    /// Default log filter when RUST_LOG is not set
    pub log_level: String,

    // Security configuration
    /// CORS allowed origins (comma-separated list or "*" for all)
    /// Default: None (CORS disabled, same-origin only)
    pub cors_allowed_origins: Option<String>,

    // Rate limiting configuration
    /// Maximum requests per second per IP address
    /// Default: 60
    pub rate_limit_requests_per_second: u32,
    /// Maximum burst size for rate limiting
    /// Default: 10
    pub rate_limit_burst_size: u32,

    // Connection limits
    /// Maximum concurrent media-stream connections
    /// Default: None (unlimited)
    pub max_websocket_connections: Option<usize>,
    /// Maximum media-stream connections per IP address
    /// Default: 100
    pub max_connections_per_ip: u32,
}

/// Zeroize the telephony API key when ServerConfig is dropped.
impl Drop for ServerConfig {
    fn drop(&mut self) {
        use zeroize::Zeroize;

        if let Some(ref mut key) = self.teler_api_key {
            key.zeroize();
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            tls: None,
            agent_websocket_url: String::new(),
            agent_sample_rate: DEFAULT_AGENT_SAMPLE_RATE.to_string(),
            agent_connect_timeout_seconds: DEFAULT_AGENT_CONNECT_TIMEOUT_SECONDS,
            teler_api_key: None,
            teler_api_url: DEFAULT_TELER_API_URL.to_string(),
            call_timeout_seconds: DEFAULT_CALL_TIMEOUT_SECONDS,
            server_domain: None,
            ngrok_api_url: DEFAULT_NGROK_API_URL.to_string(),
            stream_chunk_size: DEFAULT_STREAM_CHUNK_SIZE,
            stream_record: true,
            log_level: "info".to_string(),
            cors_allowed_origins: None,
            rate_limit_requests_per_second: 60,
            rate_limit_burst_size: 10,
            max_websocket_connections: None,
            max_connections_per_ip: 100,
        }
    }
}

impl ServerConfig {
    /// Load configuration from a YAML file with environment variable base
    ///
    /// Environment variables (including values loaded from .env in main.rs) provide
    /// the base configuration and YAML overrides specific values.
    ///
    /// Priority order (highest to lowest):
    /// 1. YAML file values
    /// 2. Environment variables (actual ENV vars override .env values)
    /// 3. .env file values
    /// 4. Default values
    ///
    /// # Errors
    /// Returns an error if:
    /// - The YAML file cannot be read or is malformed
    /// - Environment variables have invalid formats
    /// - Configuration validation fails
    pub fn from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        let yaml_config = yaml::YamlConfig::from_file(path)?;

        let config = merge::merge_config(Some(yaml_config))?;

        validation::validate_config(&config)?;

        Ok(config)
    }

    /// Get the server address as a string
    ///
    /// Returns the address in the format "host:port"
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check if TLS is enabled
    pub fn is_tls_enabled(&self) -> bool {
        self.tls.is_some()
    }

    pub fn agent_connect_timeout(&self) -> Duration {
        Duration::from_secs(self.agent_connect_timeout_seconds)
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;
    use std::fs;
    use tempfile::TempDir;

    // Helper to clean up environment variables
    fn cleanup_env_vars() {
        unsafe {
            env::remove_var("SERVER_HOST");
            env::remove_var("SERVER_PORT");
            env::remove_var("ELEVENLABS_WEBSOCKET_URL");
            env::remove_var("ELEVENLABS_SAMPLE_RATE");
            env::remove_var("TELER_API_KEY");
            env::remove_var("TELER_API_URL");
            env::remove_var("SERVER_DOMAIN");
            env::remove_var("STREAM_RECORD");
            env::remove_var("TLS_CERT_PATH");
            env::remove_var("TLS_KEY_PATH");
        }
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();

        assert_eq!(config.address(), "0.0.0.0:8000");
        assert_eq!(config.agent_sample_rate, "16k");
        assert_eq!(config.stream_chunk_size, 500);
        assert!(config.stream_record);
        assert!(!config.is_tls_enabled());
        assert_eq!(config.call_timeout(), Duration::from_secs(10));
    }

    #[test]
    #[serial]
    fn test_from_file_yaml_only() {
        cleanup_env_vars();

        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let yaml_content = r#"
server:
  host: "127.0.0.1"
  port: 8080

agent:
  websocket_url: "wss://agent.example.com/v1/convai"
  sample_rate: "8k"

telephony:
  api_key: "yaml-teler-key"
  server_domain: "bridge.example.com"
"#;

        fs::write(&config_path, yaml_content).unwrap();

        let config = ServerConfig::from_file(&config_path).unwrap();

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(
            config.agent_websocket_url,
            "wss://agent.example.com/v1/convai"
        );
        assert_eq!(config.agent_sample_rate, "8k");
        assert_eq!(config.teler_api_key.as_deref(), Some("yaml-teler-key"));
        assert_eq!(config.server_domain.as_deref(), Some("bridge.example.com"));

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_file_yaml_overrides_env() {
        cleanup_env_vars();

        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let yaml_content = r#"
server:
  host: "127.0.0.1"

telephony:
  api_key: "yaml-key"
"#;

        fs::write(&config_path, yaml_content).unwrap();

        unsafe {
            env::set_var("SERVER_HOST", "0.0.0.0");
            env::set_var("SERVER_PORT", "9100");
            env::set_var("TELER_API_KEY", "env-key");
            env::set_var("ELEVENLABS_WEBSOCKET_URL", "ws://localhost:9999/agent");
        }

        let config = ServerConfig::from_file(&config_path).unwrap();

        // YAML overrides ENV
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.teler_api_key.as_deref(), Some("yaml-key"));
        // ENV value kept where YAML is silent
        assert_eq!(config.port, 9100);
        assert_eq!(config.agent_websocket_url, "ws://localhost:9999/agent");

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_file_missing_file() {
        cleanup_env_vars();

        let config_path = PathBuf::from("/nonexistent/config.yaml");
        let result = ServerConfig::from_file(&config_path);

        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to read config file")
        );
    }

    #[test]
    #[serial]
    fn test_from_file_rejects_http_agent_url() {
        cleanup_env_vars();

        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        fs::write(
            &config_path,
            "agent:\n  websocket_url: \"https://agent.example.com\"\n",
        )
        .unwrap();

        let result = ServerConfig::from_file(&config_path);

        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("ws or wss"));
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        cleanup_env_vars();

        let config = ServerConfig::from_env().unwrap();

        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.port, DEFAULT_PORT);
        assert!(config.agent_websocket_url.is_empty());
        assert!(config.teler_api_key.is_none());
        assert!(config.stream_record);
    }

    #[test]
    #[serial]
    fn test_from_env_values() {
        cleanup_env_vars();

        unsafe {
            env::set_var("SERVER_PORT", "3001");
            env::set_var("ELEVENLABS_WEBSOCKET_URL", "wss://api.elevenlabs.io/v1/convai");
            env::set_var("ELEVENLABS_SAMPLE_RATE", "8k");
            env::set_var("TELER_API_KEY", "teler-key");
            env::set_var("STREAM_RECORD", "false");
        }

        let config = ServerConfig::from_env().unwrap();

        assert_eq!(config.port, 3001);
        assert_eq!(
            config.agent_websocket_url,
            "wss://api.elevenlabs.io/v1/convai"
        );
        assert_eq!(config.agent_sample_rate, "8k");
        assert_eq!(config.teler_api_key.as_deref(), Some("teler-key"));
        assert!(!config.stream_record);

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_env_invalid_port() {
        cleanup_env_vars();

        unsafe {
            env::set_var("SERVER_PORT", "not-a-port");
        }

        let result = ServerConfig::from_env();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("SERVER_PORT"));

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_env_tls_requires_both_paths() {
        cleanup_env_vars();

        unsafe {
            env::set_var("TLS_CERT_PATH", "/tmp/cert.pem");
        }

        let result = ServerConfig::from_env();
        assert!(result.is_err());

        unsafe {
            env::set_var("TLS_KEY_PATH", "/tmp/key.pem");
        }

        let config = ServerConfig::from_env().unwrap();
        assert!(config.is_tls_enabled());
        assert_eq!(
            config.tls,
            Some(TlsConfig {
                cert_path: PathBuf::from("/tmp/cert.pem"),
                key_path: PathBuf::from("/tmp/key.pem"),
            })
        );

        cleanup_env_vars();
    }
}
