//! HTTP router configuration
//!
//! Route registration and the middleware stack for the diagnosis API.

use axum::{
    Router,
    extract::{DefaultBodyLimit, Request, State},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::runtime::{
    DiagnosisRuntime, HttpRuntimeConfig,
    docs::{openapi_spec, swagger_ui},
    error::{RequestId, RuntimeError, request_id_middleware},
    handlers::{
        health_check, list_symptoms, metrics_endpoint, predict, predict_with_explanations,
        service_info,
    },
    metrics::track_requests,
};

impl DiagnosisRuntime {
    /// Create the Axum router with all endpoints and middleware
    pub fn router(self) -> Router {
        self.router_with_config(HttpRuntimeConfig::default())
    }

    /// Create the Axum router with custom configuration
    pub fn router_with_config(self, config: HttpRuntimeConfig) -> Router {
        let metrics = self.metrics.clone().filter(|_| config.enable_metrics);

        let mut routes = Router::new()
            .route("/", get(service_info))
            .route("/health", get(health_check))
            .route("/predict", post(predict))
            .route("/predict-with-explanations", post(predict_with_explanations))
            .route("/symptoms", get(list_symptoms));

        if config.enable_metrics {
            routes = routes.route("/metrics", get(metrics_endpoint));
        }

        let mut router = routes.with_state(self);

        // Add OpenAPI documentation if enabled
        if config.enable_openapi {
            router = router.merge(create_openapi_router());
        }

        // Innermost first: the timeout needs the request ID, and the
        // request counter should also see 408 responses. Oversized bodies
        // surface as a JSON rejection in the handler, answered with 413.
        router = router
            .layer(middleware::from_fn_with_state(
                config.request_timeout(),
                enforce_timeout,
            ))
            .layer(DefaultBodyLimit::max(config.max_body_size));

        if let Some(metrics) = metrics {
            router = router.layer(middleware::from_fn_with_state(metrics, track_requests));
        }

        router = router
            .layer(middleware::from_fn(request_id_middleware))
            .layer(TraceLayer::new_for_http());

        // Add CORS if enabled
        if config.enable_cors {
            router = router.layer(CorsLayer::permissive());
        }

        router
    }
}

/// Create OpenAPI documentation router
fn create_openapi_router() -> Router {
    Router::new()
        .route("/docs", get(swagger_ui))
        .route("/api-docs/openapi.json", get(openapi_spec))
}

/// Answer 408 with a structured body when a request runs past the deadline.
async fn enforce_timeout(
    State(timeout): State<Duration>,
    request: Request,
    next: Next,
) -> Response {
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .cloned()
        .unwrap_or_else(RequestId::generate);

    match tokio::time::timeout(timeout, next.run(request)).await {
        Ok(response) => response,
        Err(_) => {
            let duration_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
            RuntimeError::timeout(duration_ms, request_id).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request as HttpRequest, StatusCode},
    };
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_slow_request_times_out_with_error_body() {
        let app = Router::new()
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    "done"
                }),
            )
            .layer(middleware::from_fn_with_state(
                Duration::from_millis(20),
                enforce_timeout,
            ));

        let response = app
            .oneshot(HttpRequest::builder().uri("/slow").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "timeout");
    }
}
