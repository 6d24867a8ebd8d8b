//! # Nimbus HTTP Runtime
//!
//! Serves the [`nimbus_core::DiagnosisService`] over a small JSON API built on
//! Axum.
//!
//! ## Endpoints
//!
//! - `GET /`, `GET /health`: service and model status
//! - `POST /predict`: ranked diagnoses for a list of symptom identifiers
//! - `POST /predict-with-explanations`: the same, with contributing symptoms
//! - `GET /symptoms`: the symptom table
//! - `GET /metrics`: Prometheus metrics
//! - `GET /docs`, `GET /api-docs/openapi.json`: API documentation

pub mod runtime;

// Re-export main types for public API
pub use runtime::*;
