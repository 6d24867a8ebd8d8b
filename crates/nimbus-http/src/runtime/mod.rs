//! # Runtime Module
//!
//! Everything needed to put a [`nimbus_core::DiagnosisService`] behind HTTP:
//! configuration, the shared runtime state, request handlers, error mapping
//! and server lifecycle.
//!
//! ## Usage Pattern
//!
//! ```rust,no_run
//! use nimbus_http::runtime::{DiagnosisRuntime, HttpRuntimeConfigBuilder, load_model};
//! use nimbus_core::DiagnosisService;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = HttpRuntimeConfigBuilder::from_env()?.build()?;
//!     let service = DiagnosisService::new(load_model(&config.model_path));
//!     DiagnosisRuntime::new(service).serve(config).await?;
//!     Ok(())
//! }
//! ```

/// Environment-based configuration loading.
pub mod config;
/// API documentation endpoints.
pub mod docs;
/// Unified error handling and request IDs.
pub mod error;
/// HTTP request handlers organized by functionality.
pub mod handlers;
/// Runtime state and server startup.
pub mod http;
/// Prometheus metrics for predictions and requests.
pub mod metrics;
/// HTTP router configuration and route registration.
pub mod router;
/// Request and response types.
pub mod types;

pub use config::{ConfigError, HttpRuntimeConfigBuilder};
pub use error::{ErrorCode, ErrorResponse, RequestId, RuntimeError, RuntimeResult};
pub use http::{DiagnosisRuntime, HttpRuntimeConfig, load_model, shutdown_signal};
pub use metrics::RuntimeMetrics;
