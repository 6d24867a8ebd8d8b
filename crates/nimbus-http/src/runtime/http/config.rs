//! HTTP runtime configuration

use std::{net::SocketAddr, path::PathBuf, time::Duration};

/// HTTP runtime configuration
#[derive(Debug, Clone)]
pub struct HttpRuntimeConfig {
    /// Interface to bind
    pub host: String,
    /// Port to bind
    pub port: u16,
    /// Path of the JSON model artifact loaded at startup
    pub model_path: PathBuf,
    /// Request timeout in seconds
    pub request_timeout_secs: u64,
    /// Maximum request body size in bytes
    pub max_body_size: usize,
    /// Enable permissive CORS for the mobile client
    pub enable_cors: bool,
    /// Enable OpenAPI documentation endpoints
    pub enable_openapi: bool,
    /// Enable the Prometheus metrics endpoint
    pub enable_metrics: bool,
}

impl HttpRuntimeConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Socket address to listen on.
    ///
    /// Hostnames other than IP literals are resolved by the listener.
    pub fn bind_address(&self) -> String {
        match self.host.parse::<std::net::IpAddr>() {
            Ok(ip) => SocketAddr::new(ip, self.port).to_string(),
            Err(_) => format!("{}:{}", self.host, self.port),
        }
    }
}

impl Default for HttpRuntimeConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            model_path: PathBuf::from("models/classifier.json"),
            request_timeout_secs: 30,
            max_body_size: 1024 * 1024, // 1MB
            enable_cors: true,
            enable_openapi: true,
            enable_metrics: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_address() {
        let config = HttpRuntimeConfig::default();
        assert_eq!(config.bind_address(), "0.0.0.0:8000");

        let config = HttpRuntimeConfig {
            host: "::1".to_string(),
            port: 9000,
            ..HttpRuntimeConfig::default()
        };
        assert_eq!(config.bind_address(), "[::1]:9000");

        let config = HttpRuntimeConfig {
            host: "localhost".to_string(),
            ..HttpRuntimeConfig::default()
        };
        assert_eq!(config.bind_address(), "localhost:8000");
    }
}
