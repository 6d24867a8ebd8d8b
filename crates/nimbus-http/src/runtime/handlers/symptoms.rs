//! Symptom catalogue handler

use axum::{extract::State, response::Json};

use crate::runtime::{DiagnosisRuntime, types::SymptomsResponse};

/// GET /symptoms - Accepted symptom identifiers and their feature slots
#[utoipa::path(
    get,
    path = "/symptoms",
    tag = "symptoms",
    responses(
        (status = 200, description = "Symptom catalogue", body = SymptomsResponse)
    )
)]
pub async fn list_symptoms(State(runtime): State<DiagnosisRuntime>) -> Json<SymptomsResponse> {
    Json(SymptomsResponse::from(runtime.service.symptom_table()))
}
