//! Per-feature explanations for ranked diagnoses.
//!
//! For additive models the contribution of a feature to a class score is
//! exact; the strongest contributions among the symptoms that were set are
//! reported alongside each diagnosis.

use crate::encoder::FeatureVector;
use crate::model::ModelBundle;
use crate::ranker::Diagnosis;
use crate::symptoms::CONTEXT_SLOTS;
use serde::Serialize;

/// Explanations kept per diagnosis.
pub const MAX_EXPLANATIONS: usize = 5;

/// One feature's effect on a diagnosis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureExplanation {
    pub feature: String,
    /// Signed contribution to the class score.
    pub impact: f64,
    /// Raw, unscaled feature value.
    pub value: f64,
}

/// A diagnosis with its supporting features.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplainedDiagnosis {
    #[serde(flatten)]
    pub diagnosis: Diagnosis,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub explanations: Vec<FeatureExplanation>,
}

/// Rank the set symptom slots of `raw` by their contribution to a class.
///
/// `prepared` is the row the classifier actually saw. Returns an empty list
/// when the classifier cannot attribute its score.
pub(crate) fn explain_class(
    model: &ModelBundle,
    feature_names: &[String],
    raw: &FeatureVector,
    prepared: &[f64],
    class_index: usize,
) -> Vec<FeatureExplanation> {
    let Some(contributions) = model.classifier().contributions(prepared, class_index) else {
        return Vec::new();
    };

    let mut explanations: Vec<FeatureExplanation> = raw
        .active_slots()
        .filter(|slot| *slot >= CONTEXT_SLOTS)
        .filter_map(|slot| {
            let impact = *contributions.get(slot)?;
            Some(FeatureExplanation {
                feature: feature_names
                    .get(slot)
                    .cloned()
                    .unwrap_or_else(|| format!("feature_{slot}")),
                impact,
                value: raw.get(slot)?,
            })
        })
        .collect();

    explanations.sort_by(|a, b| b.impact.abs().total_cmp(&a.impact.abs()));
    explanations.truncate(MAX_EXPLANATIONS);
    explanations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::SymptomEncoder;
    use crate::model::{LogisticRegression, MultiClass};
    use crate::ranker::ConfidenceBand;
    use crate::symptoms::{FEATURE_COUNT, SymptomTable};

    fn model_favoring_cough() -> ModelBundle {
        let mut flu = vec![0.0; FEATURE_COUNT];
        flu[17] = 1.5; // cough
        flu[30] = -0.5; // fever
        let cold = vec![0.0; FEATURE_COUNT];
        ModelBundle::new(Box::new(LogisticRegression {
            classes: vec!["Flu".into(), "Cold".into()],
            coefficients: vec![flu, cold],
            intercepts: vec![0.0, 0.0],
            multi_class: MultiClass::Multinomial,
        }))
    }

    #[test]
    fn test_explains_set_symptoms_by_magnitude() {
        let model = model_favoring_cough();
        let names = SymptomTable::standard().default_feature_names();
        let encoded = SymptomEncoder::default()
            .encode(&["fever", "cough", "nausea"])
            .unwrap();
        let prepared = model.prepare(encoded.vector.as_slice()).unwrap();

        let explanations = explain_class(&model, &names, &encoded.vector, &prepared, 0);
        let features: Vec<&str> = explanations.iter().map(|e| e.feature.as_str()).collect();
        assert_eq!(features, vec!["cough", "fever", "nausea"]);
        assert_eq!(explanations[0].impact, 1.5);
        assert_eq!(explanations[1].impact, -0.5);
        assert_eq!(explanations[0].value, 1.0);
    }

    #[test]
    fn test_context_slots_are_not_explained() {
        let model = model_favoring_cough();
        let names = SymptomTable::standard().default_feature_names();
        let encoded = SymptomEncoder::default().encode(&["cough"]).unwrap();
        let prepared = model.prepare(encoded.vector.as_slice()).unwrap();

        let explanations = explain_class(&model, &names, &encoded.vector, &prepared, 0);
        assert!(explanations.iter().all(|e| e.feature != "age"));
    }

    #[test]
    fn test_serialization_flattens_diagnosis() {
        let explained = ExplainedDiagnosis {
            diagnosis: Diagnosis {
                condition: "Flu".into(),
                probability: 70,
                confidence: ConfidenceBand::High,
            },
            explanations: vec![FeatureExplanation {
                feature: "cough".into(),
                impact: 0.4,
                value: 1.0,
            }],
        };
        let json = serde_json::to_value(&explained).unwrap();
        assert_eq!(json["condition"], "Flu");
        assert_eq!(json["confidence"], "high");
        assert_eq!(json["explanations"][0]["feature"], "cough");
    }
}
