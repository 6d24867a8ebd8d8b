//! # Environment-Based Configuration
//!
//! Loads [`HttpRuntimeConfig`] from environment variables so deployments can
//! change settings without a rebuild.
//!
//! ## Environment Variables
//!
//! - `NIMBUS_HOST` - Interface to bind (default: 0.0.0.0)
//! - `NIMBUS_PORT` - Port to bind (default: 8000)
//! - `NIMBUS_MODEL_PATH` - Model artifact path (default: models/classifier.json)
//! - `NIMBUS_REQUEST_TIMEOUT_SECS` - Request timeout in seconds (default: 30)
//! - `NIMBUS_MAX_BODY_SIZE` - Maximum request body size in bytes (default: 1048576 / 1MB)
//! - `NIMBUS_ENABLE_CORS` - Enable CORS (default: true)
//! - `NIMBUS_ENABLE_OPENAPI` - Enable OpenAPI docs (default: true)
//! - `NIMBUS_ENABLE_METRICS` - Enable the Prometheus endpoint (default: true)

use crate::runtime::HttpRuntimeConfig;
use std::{env, path::PathBuf};

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid environment variable '{key}': {message}")]
    InvalidEnvVar { key: String, message: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Builder for `HttpRuntimeConfig` with environment variable support
#[derive(Debug, Clone, Default)]
pub struct HttpRuntimeConfigBuilder {
    config: HttpRuntimeConfig,
}

impl HttpRuntimeConfigBuilder {
    /// Create a new builder with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if any environment variable has an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut builder = Self::default();

        if let Some(host) = get_env_string("NIMBUS_HOST") {
            builder = builder.host(host);
        }
        if let Some(port) = get_env_u16("NIMBUS_PORT")? {
            builder = builder.port(port);
        }
        if let Some(path) = get_env_string("NIMBUS_MODEL_PATH") {
            builder = builder.model_path(PathBuf::from(path));
        }
        if let Some(timeout) = get_env_u64("NIMBUS_REQUEST_TIMEOUT_SECS")? {
            builder = builder.request_timeout_secs(timeout);
        }
        if let Some(max_size) = get_env_usize("NIMBUS_MAX_BODY_SIZE")? {
            builder = builder.max_body_size(max_size);
        }
        if let Some(cors) = get_env_bool("NIMBUS_ENABLE_CORS")? {
            builder = builder.enable_cors(cors);
        }
        if let Some(openapi) = get_env_bool("NIMBUS_ENABLE_OPENAPI")? {
            builder = builder.enable_openapi(openapi);
        }
        if let Some(metrics) = get_env_bool("NIMBUS_ENABLE_METRICS")? {
            builder = builder.enable_metrics(metrics);
        }

        Ok(builder)
    }

    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    #[must_use]
    pub fn model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.model_path = path.into();
        self
    }

    /// Set request timeout in seconds
    #[must_use]
    pub fn request_timeout_secs(mut self, timeout: u64) -> Self {
        self.config.request_timeout_secs = timeout;
        self
    }

    /// Set maximum request body size in bytes
    #[must_use]
    pub fn max_body_size(mut self, size: usize) -> Self {
        self.config.max_body_size = size;
        self
    }

    #[must_use]
    pub fn enable_cors(mut self, enable: bool) -> Self {
        self.config.enable_cors = enable;
        self
    }

    #[must_use]
    pub fn enable_openapi(mut self, enable: bool) -> Self {
        self.config.enable_openapi = enable;
        self
    }

    #[must_use]
    pub fn enable_metrics(mut self, enable: bool) -> Self {
        self.config.enable_metrics = enable;
        self
    }

    /// Build the final configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if the configuration is invalid.
    pub fn build(self) -> Result<HttpRuntimeConfig, ConfigError> {
        self.validate()?;
        Ok(self.config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let config = &self.config;

        if config.host.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "host cannot be empty".to_string(),
            ));
        }
        if config.port == 0 {
            return Err(ConfigError::ValidationError(
                "port must be greater than 0".to_string(),
            ));
        }
        if config.model_path.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "model_path cannot be empty".to_string(),
            ));
        }

        if config.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "request_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if config.request_timeout_secs > 300 {
            return Err(ConfigError::ValidationError(
                "request_timeout_secs must be <= 300 (5 minutes)".to_string(),
            ));
        }

        if config.max_body_size == 0 {
            return Err(ConfigError::ValidationError(
                "max_body_size must be greater than 0".to_string(),
            ));
        }
        if config.max_body_size > 16 * 1024 * 1024 {
            return Err(ConfigError::ValidationError(
                "max_body_size must be <= 16MB".to_string(),
            ));
        }

        Ok(())
    }
}

// Environment variable helper functions

fn get_env_string(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn get_env_bool(key: &str) -> Result<Option<bool>, ConfigError> {
    match env::var(key) {
        Ok(val) => match val.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(Some(true)),
            "false" | "0" | "no" | "off" => Ok(Some(false)),
            _ => Err(ConfigError::InvalidEnvVar {
                key: key.to_string(),
                message: format!(
                    "invalid boolean value '{val}', expected true/false/1/0/yes/no/on/off"
                ),
            }),
        },
        Err(_) => Ok(None),
    }
}

fn get_env_parsed<T>(key: &str, type_name: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(val) => val
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidEnvVar {
                key: key.to_string(),
                message: format!("invalid {type_name} value '{val}': {e}"),
            }),
        Err(_) => Ok(None),
    }
}

fn get_env_u16(key: &str) -> Result<Option<u16>, ConfigError> {
    get_env_parsed(key, "u16")
}

fn get_env_u64(key: &str) -> Result<Option<u64>, ConfigError> {
    get_env_parsed(key, "u64")
}

fn get_env_usize(key: &str) -> Result<Option<usize>, ConfigError> {
    get_env_parsed(key, "usize")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_builder() {
        let config = HttpRuntimeConfigBuilder::new().build().unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8000);
        assert_eq!(config.model_path, PathBuf::from("models/classifier.json"));
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.max_body_size, 1024 * 1024);
        assert!(config.enable_cors);
        assert!(config.enable_openapi);
        assert!(config.enable_metrics);
    }

    #[test]
    fn test_builder_validation_timeout() {
        let result = HttpRuntimeConfigBuilder::new()
            .request_timeout_secs(0)
            .build();
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("request_timeout_secs must be greater than 0")
        );

        let result = HttpRuntimeConfigBuilder::new()
            .request_timeout_secs(301)
            .build();
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("request_timeout_secs must be <= 300")
        );
    }

    #[test]
    fn test_builder_validation_max_body_size() {
        let result = HttpRuntimeConfigBuilder::new().max_body_size(0).build();
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("max_body_size must be greater than 0")
        );
    }

    #[test]
    fn test_builder_validation_port_and_host() {
        assert!(HttpRuntimeConfigBuilder::new().port(0).build().is_err());
        assert!(HttpRuntimeConfigBuilder::new().host("  ").build().is_err());
        assert!(HttpRuntimeConfigBuilder::new().model_path("").build().is_err());
    }

    #[test]
    fn test_env_bool_parsing() {
        assert_eq!(get_env_bool("NIMBUS_TEST_NONEXISTENT").unwrap(), None);
    }

    #[test]
    fn test_builder_custom_values() {
        let config = HttpRuntimeConfigBuilder::new()
            .host("127.0.0.1")
            .port(9000)
            .model_path("/srv/models/v2.json")
            .request_timeout_secs(60)
            .max_body_size(64 * 1024)
            .enable_cors(false)
            .enable_openapi(false)
            .enable_metrics(false)
            .build()
            .unwrap();

        assert_eq!(config.bind_address(), "127.0.0.1:9000");
        assert_eq!(config.model_path, PathBuf::from("/srv/models/v2.json"));
        assert_eq!(config.request_timeout_secs, 60);
        assert_eq!(config.max_body_size, 64 * 1024);
        assert!(!config.enable_cors);
        assert!(!config.enable_openapi);
        assert!(!config.enable_metrics);
    }
}
