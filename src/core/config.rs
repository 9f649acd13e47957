//! Configuration management for the MCP server.
//!
//! This module provides a centralized configuration structure that can be
//! populated from environment variables or defaults. Configuration is read
//! once at startup and shared read-only afterwards.

use super::transport::TransportConfig;
use crate::engine::{DispatchSettings, UnknownArgumentPolicy};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

/// Default base URL of the Slack Web API.
pub const DEFAULT_BASE_URL: &str = "https://slack.com/api";

/// Main configuration structure for the MCP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Transport configuration.
    pub transport: TransportConfig,

    /// Remote API and catalog configuration.
    pub api: ApiConfig,

    /// Remote API credentials.
    pub credentials: CredentialsConfig,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name of the server as reported to clients.
    pub name: String,

    /// The version of the server.
    pub version: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,
}

/// Remote API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL every operation route is appended to.
    pub base_url: String,

    /// Optional JSON catalog replacing the built-in operation table.
    pub catalog_path: Option<PathBuf>,

    /// Client-wide request timeout. `None` keeps the HTTP client default.
    pub request_timeout_secs: Option<u64>,

    /// Handling of arguments that match no declared parameter.
    pub unknown_arguments: UnknownArgumentPolicy,
}

impl LoggingConfig {
    /// Read `MCP_LOG_LEVEL` (and `.env`) on its own, so logging can be set up
    /// before the rest of the configuration reports what it loaded.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self {
            level: std::env::var("MCP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        }
    }
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

/// Credentials for the remote API.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct CredentialsConfig {
    /// Bearer token sent as `Authorization: Bearer ...` to operations that
    /// require auth.
    pub bearer_token: Option<String>,
}

/// Custom Debug implementation to redact secrets from logs.
impl std::fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field(
                "bearer_token",
                &self.bearer_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            catalog_path: None,
            request_timeout_secs: None,
            unknown_arguments: UnknownArgumentPolicy::Ignore,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "slack-web-api-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
            transport: TransportConfig::default(),
            api: ApiConfig::default(),
            credentials: CredentialsConfig::default(),
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    ///
    /// Environment variables are expected to be prefixed with `MCP_`.
    /// For example: `MCP_API_BASE_URL`, `MCP_BEARER_TOKEN`.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(name) = std::env::var("MCP_SERVER_NAME") {
            config.server.name = name;
        }

        config.logging = LoggingConfig::from_env();

        config.transport = TransportConfig::from_env();

        if let Ok(base_url) = std::env::var("MCP_API_BASE_URL") {
            config.api.base_url = base_url;
        }

        if let Ok(path) = std::env::var("MCP_CATALOG_PATH") {
            config.api.catalog_path = Some(PathBuf::from(path));
        }

        if let Ok(timeout) = std::env::var("MCP_HTTP_TIMEOUT_SECS") {
            match timeout.parse() {
                Ok(secs) => config.api.request_timeout_secs = Some(secs),
                Err(_) => warn!("Ignoring invalid MCP_HTTP_TIMEOUT_SECS: {}", timeout),
            }
        }

        if let Ok(strict) = std::env::var("MCP_STRICT_ARGUMENTS") {
            if parse_flag(&strict).unwrap_or(false) {
                config.api.unknown_arguments = UnknownArgumentPolicy::Reject;
                info!("Strict argument checking enabled: unknown arguments are rejected");
            }
        }

        match std::env::var("MCP_BEARER_TOKEN") {
            Ok(token) if !token.trim().is_empty() => {
                config.credentials.bearer_token = Some(token.trim().to_string());
                info!("Bearer token loaded from environment");
            }
            _ => warn!(
                "MCP_BEARER_TOKEN not set - requests will only carry a token \
                 if the caller passes one as an argument"
            ),
        }

        config
    }

    /// Check settings that would otherwise only fail at call time.
    pub fn validate(&self) -> super::Result<()> {
        let url = reqwest::Url::parse(&self.api.base_url).map_err(|e| {
            super::Error::config(format!("invalid API base URL '{}': {}", self.api.base_url, e))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(super::Error::config(format!(
                "API base URL must be http or https, got '{}'",
                url.scheme()
            )));
        }
        Ok(())
    }

    /// Settings handed to the dispatch engine.
    pub fn dispatch_settings(&self) -> DispatchSettings {
        let settings = DispatchSettings::new(self.api.base_url.clone())
            .with_unknown_arguments(self.api.unknown_arguments);
        match &self.credentials.bearer_token {
            Some(token) => settings.with_bearer_token(token.clone()),
            None => settings,
        }
    }
}
