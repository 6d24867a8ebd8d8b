//! Prometheus scrape handler

use axum::{
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::runtime::DiagnosisRuntime;

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// GET /metrics - Prometheus metrics endpoint
#[utoipa::path(
    get,
    path = "/metrics",
    tag = "metrics",
    responses(
        (status = 200, description = "Prometheus metrics in text format", content_type = "text/plain"),
        (status = 500, description = "Metrics are unavailable")
    )
)]
pub async fn metrics_endpoint(State(runtime): State<DiagnosisRuntime>) -> Response {
    let Some(metrics) = runtime.metrics.as_deref() else {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Metrics registry unavailable",
        )
            .into_response();
    };

    match metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to encode metrics: {e}"),
            )
                .into_response()
        }
    }
}
