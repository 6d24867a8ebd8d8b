//! Prediction handlers
//!
//! Both endpoints run the same pipeline: encode the submitted identifiers,
//! evaluate the model, rank the classes. The explanation variant also
//! attaches the strongest contributing symptoms to every diagnosis.

use axum::{
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
};
use std::time::Instant;

use crate::runtime::{
    DiagnosisRuntime,
    error::{ErrorResponse, RequestId, RuntimeError, RuntimeResult},
    types::{
        DiagnosisResult, ExplainedDiagnosisResult, ExplainedPredictionResponse,
        PredictionRequest, PredictionResponse,
    },
};

/// POST /predict - Rank likely conditions for a set of symptoms
#[utoipa::path(
    post,
    path = "/predict",
    tag = "predictions",
    request_body = PredictionRequest,
    responses(
        (status = 200, description = "Ranked diagnoses", body = PredictionResponse),
        (status = 400, description = "No symptoms selected or malformed body", body = ErrorResponse),
        (status = 413, description = "Request body too large", body = ErrorResponse),
        (status = 500, description = "Model evaluation failed", body = ErrorResponse),
        (status = 503, description = "Model is not loaded", body = ErrorResponse)
    )
)]
pub async fn predict(
    State(runtime): State<DiagnosisRuntime>,
    request_id: RequestId,
    payload: Result<Json<PredictionRequest>, JsonRejection>,
) -> RuntimeResult<Json<PredictionResponse>> {
    let started = Instant::now();
    let result = parse_request(payload, &request_id).and_then(|request| {
        let prediction = runtime
            .service
            .predict(&request.symptoms)
            .map_err(|e| RuntimeError::from_predict(e, request_id.clone()))?;

        Ok(PredictionResponse {
            diagnoses: prediction
                .diagnoses
                .into_iter()
                .map(DiagnosisResult::from)
                .collect(),
            total_symptoms: request.symptoms.len(),
            selected_symptoms: request.symptoms,
        })
    });

    record_outcome(&runtime, "predict", started, &result);
    result.map(Json)
}

/// POST /predict-with-explanations - Rank conditions and explain each one
#[utoipa::path(
    post,
    path = "/predict-with-explanations",
    tag = "predictions",
    request_body = PredictionRequest,
    responses(
        (status = 200, description = "Ranked diagnoses with explanations", body = ExplainedPredictionResponse),
        (status = 400, description = "No symptoms selected or malformed body", body = ErrorResponse),
        (status = 413, description = "Request body too large", body = ErrorResponse),
        (status = 500, description = "Model evaluation failed", body = ErrorResponse),
        (status = 503, description = "Model is not loaded", body = ErrorResponse)
    )
)]
pub async fn predict_with_explanations(
    State(runtime): State<DiagnosisRuntime>,
    request_id: RequestId,
    payload: Result<Json<PredictionRequest>, JsonRejection>,
) -> RuntimeResult<Json<ExplainedPredictionResponse>> {
    let started = Instant::now();
    let result = parse_request(payload, &request_id).and_then(|request| {
        let prediction = runtime
            .service
            .predict_with_explanations(&request.symptoms)
            .map_err(|e| RuntimeError::from_predict(e, request_id.clone()))?;

        Ok(ExplainedPredictionResponse {
            diagnoses: prediction
                .diagnoses
                .into_iter()
                .map(ExplainedDiagnosisResult::from)
                .collect(),
            total_symptoms: request.symptoms.len(),
            selected_symptoms: request.symptoms,
        })
    });

    record_outcome(&runtime, "predict_with_explanations", started, &result);
    result.map(Json)
}

fn parse_request(
    payload: Result<Json<PredictionRequest>, JsonRejection>,
    request_id: &RequestId,
) -> RuntimeResult<PredictionRequest> {
    payload.map(|Json(request)| request).map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            RuntimeError::payload_too_large(request_id.clone())
        } else {
            RuntimeError::invalid_json(rejection.body_text(), request_id.clone())
        }
    })
}

fn record_outcome<T>(
    runtime: &DiagnosisRuntime,
    endpoint: &str,
    started: Instant,
    result: &RuntimeResult<T>,
) {
    let Some(metrics) = runtime.metrics.as_deref() else {
        return;
    };
    let outcome = match result {
        Ok(_) => "success",
        Err(e) => e.error_code().as_str(),
    };
    metrics.record_prediction(endpoint, outcome, started.elapsed());
}
