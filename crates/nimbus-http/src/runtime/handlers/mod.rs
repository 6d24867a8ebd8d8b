//! HTTP request handlers
//!
//! Endpoint handlers grouped by what they serve.

pub mod metrics;
pub mod predict;
pub mod service;
pub mod symptoms;

// Re-export handlers for convenience
pub use metrics::*;
pub use predict::*;
pub use service::*;
pub use symptoms::*;
