//! Service status handlers
//!
//! `GET /` and `GET /health`. Both also answer `HEAD`, which uptime monitors
//! use to check the service.

use axum::{extract::State, response::Json};

use crate::runtime::{
    DiagnosisRuntime,
    types::{API_VERSION, HealthResponse, ModelStatus, ServiceInfoResponse},
};

/// GET / - Service banner with model and symptom counts
#[utoipa::path(
    get,
    path = "/",
    tag = "service",
    responses(
        (status = 200, description = "Service is running", body = ServiceInfoResponse)
    )
)]
pub async fn service_info(State(runtime): State<DiagnosisRuntime>) -> Json<ServiceInfoResponse> {
    let service = &runtime.service;
    Json(ServiceInfoResponse {
        message: "NimbusVita ML API is running".to_string(),
        version: API_VERSION.to_string(),
        model_loaded: service.is_model_loaded(),
        available_symptoms: service.symptom_table().len(),
        model_features: service.model_feature_count(),
    })
}

/// GET /health - Liveness check reporting whether a model is loaded
///
/// Answers 200 even without a model; readiness for predictions is signalled
/// through `model_status`.
#[utoipa::path(
    get,
    path = "/health",
    tag = "service",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health_check(State(runtime): State<DiagnosisRuntime>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        model_status: ModelStatus::from_loaded(runtime.service.is_model_loaded()),
    })
}
