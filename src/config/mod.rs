use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info};

/// Prefix shared by every service setting, e.g. `MENU_HOST`
pub const ENV_PREFIX: &str = "MENU";

/// Plain port variable honoured ahead of `MENU_PORT`
pub const PORT_VAR: &str = "PORT";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading error: {message}")]
    LoadError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_max_request_size")]
    pub max_request_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_service_version")]
    pub service_version: String,
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub enable_json_logging: bool,
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_environment() -> Result<Self, ConfigError> {
        info!("Loading configuration from environment");
        Self::from_vars(std::env::vars().collect())
    }

    /// Load configuration from an explicit set of variables
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port_override = vars
            .get(PORT_VAR)
            .filter(|port| !port.trim().is_empty())
            .cloned();

        let settings = config::Config::builder()
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .source(Some(vars)),
            )
            .set_override_option("port", port_override)
            .and_then(|builder| builder.build())
            .map_err(|e| ConfigError::LoadError {
                message: format!("Failed to load settings: {}", e),
            })?;

        let server: ServerConfig =
            settings
                .clone()
                .try_deserialize()
                .map_err(|e| ConfigError::LoadError {
                    message: format!("Failed to deserialize server config: {}", e),
                })?;

        let observability: ObservabilityConfig =
            settings
                .try_deserialize()
                .map_err(|e| ConfigError::LoadError {
                    message: format!("Failed to deserialize observability config: {}", e),
                })?;

        let config = Config {
            server,
            observability,
        };

        config.validate()?;

        debug!("Configuration: {:?}", config);
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError {
                message: "Server port cannot be 0".to_string(),
            });
        }

        if self.server.max_request_size == 0 {
            return Err(ConfigError::ValidationError {
                message: "Max request size cannot be 0".to_string(),
            });
        }

        if self.observability.service_name.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                message: "Service name cannot be empty".to_string(),
            });
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: default_host(),
                port: default_port(),
                max_request_size: default_max_request_size(),
            },
            observability: ObservabilityConfig {
                service_name: default_service_name(),
                service_version: default_service_version(),
                otlp_endpoint: None,
                log_level: default_log_level(),
                enable_json_logging: false,
            },
        }
    }
}

impl ServerConfig {
    /// Address the listener binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl ObservabilityConfig {
    /// Configured OTLP collector, ignoring a blank value
    pub fn otlp_endpoint(&self) -> Option<&str> {
        self.otlp_endpoint
            .as_deref()
            .map(str::trim)
            .filter(|endpoint| !endpoint.is_empty())
    }
}

// Default value functions
pub(crate) fn default_host() -> String {
    "0.0.0.0".to_string()
}

pub(crate) fn default_port() -> u16 {
    3000
}

pub(crate) fn default_max_request_size() -> usize {
    1024 * 1024 // 1MB
}

pub(crate) fn default_service_name() -> String {
    "menu-rs".to_string()
}

pub(crate) fn default_service_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

pub(crate) fn default_log_level() -> String {
    "info".to_string()
}
