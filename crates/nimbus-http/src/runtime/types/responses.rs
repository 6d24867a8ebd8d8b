//! Response type definitions for HTTP endpoints

use nimbus_core::{
    ConfidenceBand, Diagnosis, ExplainedDiagnosis, FeatureExplanation, SymptomTable,
};
use serde::Serialize;
use utoipa::ToSchema;

/// API version reported by `GET /`
pub const API_VERSION: &str = "1.0.0";

/// Response for `GET /`
#[derive(Debug, Serialize, ToSchema)]
pub struct ServiceInfoResponse {
    #[schema(example = "NimbusVita ML API is running")]
    pub message: String,
    #[schema(example = "1.0.0")]
    pub version: String,
    /// Whether a model artifact was loaded at startup
    pub model_loaded: bool,
    /// Number of symptom identifiers accepted, aliases included
    #[schema(example = 45)]
    pub available_symptoms: usize,
    /// Number of feature names the model artifact declares, 0 when none
    #[schema(example = 50)]
    pub model_features: usize,
}

/// Model availability reported by `GET /health`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ModelStatus {
    Loaded,
    NotLoaded,
}

impl ModelStatus {
    pub fn from_loaded(loaded: bool) -> Self {
        if loaded { Self::Loaded } else { Self::NotLoaded }
    }
}

/// Response for `GET /health`
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Always `healthy` while the process is serving
    #[schema(example = "healthy")]
    pub status: String,
    pub model_status: ModelStatus,
}

/// One ranked diagnosis
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DiagnosisResult {
    #[schema(example = "Flu")]
    pub condition: String,
    /// Rounded percentage between 2 and 100
    #[schema(example = 70)]
    pub probability: u32,
    /// `high` above 60, `medium` above 30, otherwise `low`
    #[schema(value_type = String, example = "high")]
    pub confidence: ConfidenceBand,
}

impl From<Diagnosis> for DiagnosisResult {
    fn from(diagnosis: Diagnosis) -> Self {
        Self {
            condition: diagnosis.condition,
            probability: diagnosis.probability,
            confidence: diagnosis.confidence,
        }
    }
}

/// Response for `POST /predict`
#[derive(Debug, Serialize, ToSchema)]
pub struct PredictionResponse {
    /// At most five diagnoses, most likely first
    pub diagnoses: Vec<DiagnosisResult>,
    /// The symptom identifiers as submitted
    pub selected_symptoms: Vec<String>,
    /// Number of submitted identifiers
    pub total_symptoms: usize,
}

/// A symptom's contribution to a diagnosis
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FeatureImpact {
    #[schema(example = "cough")]
    pub feature: String,
    /// Signed contribution to the condition's score
    #[schema(example = 0.42)]
    pub impact: f64,
    /// Raw feature value, 1 for a present symptom
    #[schema(example = 1.0)]
    pub value: f64,
}

impl From<FeatureExplanation> for FeatureImpact {
    fn from(explanation: FeatureExplanation) -> Self {
        Self {
            feature: explanation.feature,
            impact: explanation.impact,
            value: explanation.value,
        }
    }
}

/// A ranked diagnosis with the symptoms that drove it
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ExplainedDiagnosisResult {
    #[schema(example = "Flu")]
    pub condition: String,
    #[schema(example = 70)]
    pub probability: u32,
    #[schema(value_type = String, example = "high")]
    pub confidence: ConfidenceBand,
    /// Up to five contributions, largest magnitude first; empty when the
    /// model cannot attribute its score
    pub explanations: Vec<FeatureImpact>,
}

impl From<ExplainedDiagnosis> for ExplainedDiagnosisResult {
    fn from(explained: ExplainedDiagnosis) -> Self {
        Self {
            condition: explained.diagnosis.condition,
            probability: explained.diagnosis.probability,
            confidence: explained.diagnosis.confidence,
            explanations: explained
                .explanations
                .into_iter()
                .map(FeatureImpact::from)
                .collect(),
        }
    }
}

/// Response for `POST /predict-with-explanations`
#[derive(Debug, Serialize, ToSchema)]
pub struct ExplainedPredictionResponse {
    pub diagnoses: Vec<ExplainedDiagnosisResult>,
    pub selected_symptoms: Vec<String>,
    pub total_symptoms: usize,
}

/// Response for `GET /symptoms`
#[derive(Debug, Serialize, ToSchema)]
pub struct SymptomsResponse {
    #[schema(example = 45)]
    pub total: usize,
    /// Symptom identifier to feature slot, in feature order
    #[schema(value_type = Object)]
    pub symptoms: SymptomTable,
}

impl From<&SymptomTable> for SymptomsResponse {
    fn from(table: &SymptomTable) -> Self {
        Self {
            total: table.len(),
            symptoms: table.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_status_serialization() {
        let json = serde_json::to_value(HealthResponse {
            status: "healthy".to_string(),
            model_status: ModelStatus::from_loaded(false),
        })
        .unwrap();
        assert_eq!(json["model_status"], "not_loaded");
    }

    #[test]
    fn test_explained_result_always_has_explanations_field() {
        let result = ExplainedDiagnosisResult::from(ExplainedDiagnosis {
            diagnosis: Diagnosis {
                condition: "Cold".to_string(),
                probability: 20,
                confidence: ConfidenceBand::Low,
            },
            explanations: Vec::new(),
        });
        let json = serde_json::to_value(result).unwrap();
        assert_eq!(json["confidence"], "low");
        assert_eq!(json["explanations"], serde_json::json!([]));
    }

    #[test]
    fn test_symptoms_response_from_table() {
        let response = SymptomsResponse::from(&SymptomTable::standard());
        assert_eq!(response.total, 45);
        assert_eq!(response.symptoms.slot("pain_behind_eyes"), Some(12));

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.starts_with(r#"{"total":45,"symptoms":{"nausea":5,"joint_pain":6,"#));
    }
}
