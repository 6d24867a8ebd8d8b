//! Diagnosis service
//!
//! Owns everything a prediction needs: the symptom encoder, the optional
//! model bundle and the ranker. Built once at startup and only read after
//! that, so request handlers share it without locking.

use crate::encoder::{EncodedSymptoms, SymptomEncoder};
use crate::error::PredictError;
use crate::explain::{ExplainedDiagnosis, explain_class};
use crate::model::ModelBundle;
use crate::ranker::{Diagnosis, DiagnosisRanker, RankedClass, RankerConfig};
use crate::symptoms::SymptomTable;
use serde::Serialize;
use std::sync::Arc;

/// Ranked diagnoses for one request.
#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    pub diagnoses: Vec<Diagnosis>,
    /// Identifiers that matched the symptom table.
    pub recognized: Vec<String>,
    /// Identifiers that were dropped as unknown.
    pub ignored: Vec<String>,
}

/// Ranked diagnoses with per-feature explanations.
#[derive(Debug, Clone, Serialize)]
pub struct ExplainedPrediction {
    pub diagnoses: Vec<ExplainedDiagnosis>,
    pub recognized: Vec<String>,
    pub ignored: Vec<String>,
}

/// Intermediate state shared by both prediction paths.
struct Evaluation<'a> {
    model: &'a ModelBundle,
    encoded: EncodedSymptoms,
    prepared: Vec<f64>,
    ranked: Vec<RankedClass>,
}

/// Symptom-to-diagnosis pipeline.
#[derive(Debug, Clone)]
pub struct DiagnosisService {
    model: Option<Arc<ModelBundle>>,
    encoder: SymptomEncoder,
    ranker: DiagnosisRanker,
    feature_names: Arc<[String]>,
}

impl DiagnosisService {
    /// Create a service around an optional model.
    ///
    /// Without a model the service still answers metadata queries, but every
    /// prediction fails with [`PredictError::ModelUnavailable`].
    pub fn new(model: Option<ModelBundle>) -> Self {
        Self::with_encoder(model, SymptomEncoder::default())
    }

    pub fn with_encoder(model: Option<ModelBundle>, encoder: SymptomEncoder) -> Self {
        let feature_names: Arc<[String]> = match &model {
            Some(bundle) if !bundle.feature_names().is_empty() => bundle.feature_names().into(),
            _ => encoder.table().default_feature_names().into(),
        };
        Self {
            model: model.map(Arc::new),
            encoder,
            ranker: DiagnosisRanker::default(),
            feature_names,
        }
    }

    #[must_use]
    pub fn with_ranker(mut self, config: RankerConfig) -> Self {
        self.ranker = DiagnosisRanker::new(config);
        self
    }

    pub fn is_model_loaded(&self) -> bool {
        self.model.is_some()
    }

    pub fn model(&self) -> Option<&ModelBundle> {
        self.model.as_deref()
    }

    pub fn symptom_table(&self) -> &SymptomTable {
        self.encoder.table()
    }

    /// Number of feature names the loaded artifact declares, or 0.
    pub fn model_feature_count(&self) -> usize {
        self.model
            .as_ref()
            .map_or(0, |bundle| bundle.feature_names().len())
    }

    /// Names used to label explanation entries, one per feature slot.
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Rank the likely conditions for a list of symptom identifiers.
    pub fn predict<S: AsRef<str>>(&self, symptoms: &[S]) -> Result<Prediction, PredictError> {
        let evaluation = self.evaluate(symptoms)?;
        Ok(Prediction {
            diagnoses: evaluation
                .ranked
                .into_iter()
                .map(|ranked| ranked.diagnosis)
                .collect(),
            recognized: evaluation.encoded.recognized,
            ignored: evaluation.encoded.ignored,
        })
    }

    /// Same as [`Self::predict`], with the strongest contributing symptoms
    /// attached to every diagnosis.
    pub fn predict_with_explanations<S: AsRef<str>>(
        &self,
        symptoms: &[S],
    ) -> Result<ExplainedPrediction, PredictError> {
        let evaluation = self.evaluate(symptoms)?;
        let diagnoses = evaluation
            .ranked
            .into_iter()
            .map(|ranked| ExplainedDiagnosis {
                explanations: explain_class(
                    evaluation.model,
                    &self.feature_names,
                    &evaluation.encoded.vector,
                    &evaluation.prepared,
                    ranked.class_index,
                ),
                diagnosis: ranked.diagnosis,
            })
            .collect();

        Ok(ExplainedPrediction {
            diagnoses,
            recognized: evaluation.encoded.recognized,
            ignored: evaluation.encoded.ignored,
        })
    }

    fn evaluate<S: AsRef<str>>(&self, symptoms: &[S]) -> Result<Evaluation<'_>, PredictError> {
        let model = self.model.as_deref().ok_or(PredictError::ModelUnavailable)?;
        let encoded = self.encoder.encode(symptoms)?;
        let prepared = model.prepare(encoded.vector.as_slice())?;
        let probabilities = model.predict_prepared(&prepared)?;
        let ranked = self
            .ranker
            .rank_indexed(model.class_labels(), &probabilities)?;

        tracing::debug!(
            symptoms = symptoms.len(),
            recognized = encoded.recognized.len(),
            diagnoses = ranked.len(),
            top = ranked.first().map(|r| r.diagnosis.condition.as_str()),
            "Prediction evaluated"
        );

        Ok(Evaluation {
            model,
            encoded,
            prepared,
            ranked,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Classifier, LabelEncoder, LogisticRegression, MultiClass};
    use crate::ranker::ConfidenceBand;
    use crate::symptoms::FEATURE_COUNT;
    use crate::{ModelError, ModelResult};

    /// Returns the same probabilities for every input.
    #[derive(Debug)]
    struct FixedClassifier {
        classes: Vec<String>,
        probabilities: Vec<f64>,
    }

    impl Classifier for FixedClassifier {
        fn kind(&self) -> &'static str {
            "fixed"
        }

        fn n_features(&self) -> usize {
            FEATURE_COUNT
        }

        fn classes(&self) -> &[String] {
            &self.classes
        }

        fn predict_proba(&self, _features: &[f64]) -> ModelResult<Vec<f64>> {
            Ok(self.probabilities.clone())
        }
    }

    fn scenario_service() -> DiagnosisService {
        let classifier = FixedClassifier {
            classes: ["Flu", "Cold", "Allergy", "COVID", "Other"]
                .map(String::from)
                .to_vec(),
            probabilities: vec![0.7, 0.2, 0.05, 0.03, 0.02],
        };
        DiagnosisService::new(Some(ModelBundle::new(Box::new(classifier))))
    }

    #[test]
    fn test_reference_scenario() {
        let prediction = scenario_service().predict(&["fever", "cough"]).unwrap();
        let summary: Vec<(&str, u32, ConfidenceBand)> = prediction
            .diagnoses
            .iter()
            .map(|d| (d.condition.as_str(), d.probability, d.confidence))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("Flu", 70, ConfidenceBand::High),
                ("Cold", 20, ConfidenceBand::Low),
                ("Allergy", 5, ConfidenceBand::Low),
                ("COVID", 3, ConfidenceBand::Low),
                ("Other", 2, ConfidenceBand::Low),
            ]
        );
        assert_eq!(prediction.recognized, vec!["fever", "cough"]);
    }

    #[test]
    fn test_missing_model_is_checked_before_empty_list() {
        let service = DiagnosisService::new(None);
        assert!(!service.is_model_loaded());

        let empty: [&str; 0] = [];
        assert!(matches!(
            service.predict(&empty),
            Err(PredictError::ModelUnavailable)
        ));
        assert!(matches!(
            service.predict(&["fever"]),
            Err(PredictError::ModelUnavailable)
        ));
    }

    #[test]
    fn test_empty_list_is_rejected() {
        let empty: [&str; 0] = [];
        assert!(matches!(
            scenario_service().predict(&empty),
            Err(PredictError::NoSymptoms)
        ));
    }

    #[test]
    fn test_unknown_symptoms_are_reported() {
        let prediction = scenario_service().predict(&["fever", "hiccups"]).unwrap();
        assert_eq!(prediction.ignored, vec!["hiccups"]);
        assert_eq!(prediction.diagnoses.len(), 5);
    }

    #[test]
    fn test_model_width_mismatch_is_a_model_error() {
        let model = LogisticRegression {
            classes: vec!["Flu".into(), "Cold".into()],
            coefficients: vec![vec![1.0; 3], vec![0.0; 3]],
            intercepts: vec![0.0, 0.0],
            multi_class: MultiClass::Multinomial,
        };
        let service = DiagnosisService::new(Some(ModelBundle::new(Box::new(model))));
        let err = service.predict(&["fever"]).unwrap_err();
        assert!(matches!(
            err,
            PredictError::Model(ModelError::FeatureMismatch {
                expected: 3,
                actual: 50
            })
        ));
    }

    #[test]
    fn test_label_encoder_names_the_classes() {
        let classifier = FixedClassifier {
            classes: vec!["0".into(), "1".into()],
            probabilities: vec![0.25, 0.75],
        };
        let bundle = ModelBundle::new(Box::new(classifier))
            .with_label_encoder(LabelEncoder::new(vec!["Dengue".into(), "Zika".into()]));
        let prediction = DiagnosisService::new(Some(bundle))
            .predict(&["rashes"])
            .unwrap();
        assert_eq!(prediction.diagnoses[0].condition, "Zika");
        assert_eq!(prediction.diagnoses[1].condition, "Dengue");
    }

    #[test]
    fn test_custom_ranker() {
        let service = scenario_service().with_ranker(RankerConfig {
            max_results: 2,
            ..RankerConfig::default()
        });
        let prediction = service.predict(&["fever"]).unwrap();
        assert_eq!(prediction.diagnoses.len(), 2);
    }

    #[test]
    fn test_model_feature_count() {
        assert_eq!(DiagnosisService::new(None).model_feature_count(), 0);
        assert_eq!(scenario_service().model_feature_count(), 0);

        let names = SymptomTable::standard().default_feature_names();
        let classifier = FixedClassifier {
            classes: vec!["a".into(), "b".into()],
            probabilities: vec![0.5, 0.5],
        };
        let bundle = ModelBundle::new(Box::new(classifier)).with_feature_names(names);
        assert_eq!(
            DiagnosisService::new(Some(bundle)).model_feature_count(),
            FEATURE_COUNT
        );
    }

    #[test]
    fn test_explanations_for_linear_model() {
        let mut flu = vec![0.0; FEATURE_COUNT];
        flu[30] = 2.0;
        flu[17] = 1.0;
        let model = LogisticRegression {
            classes: vec!["Flu".into(), "Cold".into()],
            coefficients: vec![flu, vec![0.0; FEATURE_COUNT]],
            intercepts: vec![0.0, 0.0],
            multi_class: MultiClass::Multinomial,
        };
        let service = DiagnosisService::new(Some(ModelBundle::new(Box::new(model))));

        let prediction = service
            .predict_with_explanations(&["cough", "fever"])
            .unwrap();
        let flu = &prediction.diagnoses[0];
        assert_eq!(flu.diagnosis.condition, "Flu");
        let features: Vec<&str> = flu.explanations.iter().map(|e| e.feature.as_str()).collect();
        assert_eq!(features, vec!["fever", "cough"]);
    }

    #[test]
    fn test_no_explanations_without_contributions() {
        let prediction = scenario_service()
            .predict_with_explanations(&["fever", "cough"])
            .unwrap();
        assert_eq!(prediction.diagnoses.len(), 5);
        assert!(prediction.diagnoses.iter().all(|d| d.explanations.is_empty()));
    }
}
