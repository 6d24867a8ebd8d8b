//! API documentation handlers
//!
//! OpenAPI specification and a Swagger UI page for the diagnosis API.

use axum::response::{Html, Json};
use utoipa::OpenApi;

use crate::runtime::{
    error::{ErrorCode, ErrorResponse},
    types::{
        DiagnosisResult, ExplainedDiagnosisResult, ExplainedPredictionResponse, FeatureImpact,
        HealthResponse, ModelStatus, PredictionRequest, PredictionResponse, ServiceInfoResponse,
        SymptomsResponse,
    },
};

/// GET /docs - Swagger UI for interactive API documentation
pub async fn swagger_ui() -> Html<&'static str> {
    Html(
        r#"
<!DOCTYPE html>
<html>
<head>
    <title>NimbusVita ML API Documentation</title>
    <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui.css" />
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui-bundle.js"></script>
    <script>
        SwaggerUIBundle({
            url: '/api-docs/openapi.json',
            dom_id: '#swagger-ui',
            presets: [
                SwaggerUIBundle.presets.apis,
                SwaggerUIBundle.presets.standalone
            ]
        });
    </script>
</body>
</html>
        "#,
    )
}

/// GET /api-docs/openapi.json - OpenAPI specification endpoint
pub async fn openapi_spec() -> Json<utoipa::openapi::OpenApi> {
    #[derive(OpenApi)]
    #[openapi(
        paths(
            crate::runtime::handlers::service_info,
            crate::runtime::handlers::health_check,
            crate::runtime::handlers::predict,
            crate::runtime::handlers::predict_with_explanations,
            crate::runtime::handlers::list_symptoms,
            crate::runtime::handlers::metrics_endpoint
        ),
        components(
            schemas(
                PredictionRequest,
                PredictionResponse,
                DiagnosisResult,
                ExplainedPredictionResponse,
                ExplainedDiagnosisResult,
                FeatureImpact,
                ServiceInfoResponse,
                HealthResponse,
                ModelStatus,
                SymptomsResponse,
                ErrorResponse,
                ErrorCode
            )
        ),
        tags(
            (name = "service", description = "Service status endpoints"),
            (name = "predictions", description = "Symptom-based diagnosis endpoints"),
            (name = "symptoms", description = "Symptom catalogue"),
            (name = "metrics", description = "Prometheus metrics")
        ),
        info(
            title = "NimbusVita ML API",
            version = "1.0.0",
            description = "Ranks likely medical conditions from a list of reported symptoms"
        ),
        servers(
            (url = "http://localhost:8000", description = "Local development server")
        )
    )]
    struct ApiDoc;

    Json(ApiDoc::openapi())
}
