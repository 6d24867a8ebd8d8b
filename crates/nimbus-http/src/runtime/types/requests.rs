//! Request type definitions for HTTP endpoints

use serde::Deserialize;
use utoipa::ToSchema;

/// Request body for `/predict` and `/predict-with-explanations`
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PredictionRequest {
    /// Identifiers of the symptoms selected in the symptom checker
    #[schema(example = json!(["fever", "cough", "headache"]))]
    pub symptoms: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize() {
        let request: PredictionRequest =
            serde_json::from_str(r#"{"symptoms": ["fever", "cough"]}"#).unwrap();
        assert_eq!(request.symptoms, vec!["fever", "cough"]);
    }

    #[test]
    fn test_symptoms_field_is_required() {
        assert!(serde_json::from_str::<PredictionRequest>("{}").is_err());
    }
}
