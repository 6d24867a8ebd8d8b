//! Loaded model artifact: classifier plus optional preprocessing.

use super::{Classifier, ClassifierSpec, LabelEncoder, StandardScaler};
use crate::error::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which of the two artifact layouts a bundle was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactShape {
    /// Object with a `model` key and optional preprocessing keys.
    Bundle,
    /// The classifier object on its own.
    Bare,
}

#[derive(Deserialize)]
struct BundleFile {
    model: ClassifierSpec,
    #[serde(default)]
    label_encoder: Option<LabelEncoder>,
    #[serde(default)]
    scaler: Option<StandardScaler>,
    #[serde(default)]
    feature_names: Vec<String>,
}

/// Overview of a bundle, for startup logs and `nimbus inspect`.
#[derive(Debug, Clone, Serialize)]
pub struct ModelSummary {
    pub shape: ArtifactShape,
    pub kind: &'static str,
    pub n_features: usize,
    pub classes: Vec<String>,
    pub has_label_encoder: bool,
    pub has_scaler: bool,
    pub feature_names: Vec<String>,
}

/// Immutable classifier bundle, loaded once at startup.
#[derive(Debug)]
pub struct ModelBundle {
    classifier: Box<dyn Classifier>,
    label_encoder: Option<LabelEncoder>,
    scaler: Option<StandardScaler>,
    feature_names: Vec<String>,
    shape: ArtifactShape,
}

impl ModelBundle {
    /// Wrap a classifier with no preprocessing.
    pub fn new(classifier: Box<dyn Classifier>) -> Self {
        Self {
            classifier,
            label_encoder: None,
            scaler: None,
            feature_names: Vec::new(),
            shape: ArtifactShape::Bare,
        }
    }

    #[must_use]
    pub fn with_label_encoder(mut self, label_encoder: LabelEncoder) -> Self {
        self.label_encoder = Some(label_encoder);
        self.shape = ArtifactShape::Bundle;
        self
    }

    #[must_use]
    pub fn with_scaler(mut self, scaler: StandardScaler) -> Self {
        self.scaler = Some(scaler);
        self.shape = ArtifactShape::Bundle;
        self
    }

    #[must_use]
    pub fn with_feature_names(mut self, feature_names: Vec<String>) -> Self {
        self.feature_names = feature_names;
        self.shape = ArtifactShape::Bundle;
        self
    }

    /// Read and validate an artifact file.
    pub fn load(path: impl AsRef<Path>) -> ModelResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let bundle = Self::from_json_str(&contents)?;
        tracing::debug!(
            path = %path.display(),
            kind = bundle.classifier.kind(),
            classes = bundle.class_labels().len(),
            "Model artifact parsed"
        );
        Ok(bundle)
    }

    /// Parse and validate an artifact from JSON text.
    pub fn from_json_str(json: &str) -> ModelResult<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let is_bundle = value
            .as_object()
            .is_some_and(|object| object.contains_key("model"));

        let bundle = if is_bundle {
            let file: BundleFile = serde_json::from_value(value)?;
            Self {
                classifier: file.model.into_classifier()?,
                label_encoder: file.label_encoder,
                scaler: file.scaler,
                feature_names: file.feature_names,
                shape: ArtifactShape::Bundle,
            }
        } else {
            let classifier: ClassifierSpec = serde_json::from_value(value)?;
            Self::new(classifier.into_classifier()?)
        };

        bundle.validate()?;
        Ok(bundle)
    }

    /// Check that the parts agree with each other.
    pub fn validate(&self) -> ModelResult<()> {
        let n_features = self.classifier.n_features();
        let n_classes = self.classifier.classes().len();

        if let Some(scaler) = &self.scaler {
            scaler.validate()?;
            if scaler.n_features() != n_features {
                return Err(ModelError::invalid(format!(
                    "scaler covers {} features, model expects {n_features}",
                    scaler.n_features()
                )));
            }
        }
        if let Some(encoder) = &self.label_encoder {
            if encoder.len() != n_classes {
                return Err(ModelError::invalid(format!(
                    "label encoder has {} classes, model has {n_classes}",
                    encoder.len()
                )));
            }
        }
        if !self.feature_names.is_empty() && self.feature_names.len() != n_features {
            return Err(ModelError::invalid(format!(
                "{} feature names for {n_features} features",
                self.feature_names.len()
            )));
        }
        Ok(())
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    /// Feature names carried by the artifact; empty when it had none.
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn n_features(&self) -> usize {
        self.classifier.n_features()
    }

    /// Labels reported to clients: the label encoder's classes when present,
    /// otherwise the classifier's own.
    pub fn class_labels(&self) -> &[String] {
        match &self.label_encoder {
            Some(encoder) => &encoder.classes,
            None => self.classifier.classes(),
        }
    }

    /// Apply the scaler, if any.
    pub fn prepare(&self, features: &[f64]) -> ModelResult<Vec<f64>> {
        let expected = self.n_features();
        if features.len() != expected {
            return Err(ModelError::FeatureMismatch {
                expected,
                actual: features.len(),
            });
        }
        match &self.scaler {
            Some(scaler) => scaler.transform(features),
            None => Ok(features.to_vec()),
        }
    }

    /// Class probabilities for an unscaled feature row.
    pub fn predict_proba(&self, features: &[f64]) -> ModelResult<Vec<f64>> {
        let prepared = self.prepare(features)?;
        self.predict_prepared(&prepared)
    }

    /// Class probabilities for a row that already went through [`Self::prepare`].
    pub fn predict_prepared(&self, prepared: &[f64]) -> ModelResult<Vec<f64>> {
        let probabilities = self.classifier.predict_proba(prepared)?;
        if probabilities.len() != self.class_labels().len() {
            return Err(ModelError::invalid(format!(
                "model returned {} probabilities for {} classes",
                probabilities.len(),
                self.class_labels().len()
            )));
        }
        if probabilities.iter().any(|p| !p.is_finite()) {
            return Err(ModelError::NonFiniteOutput);
        }
        Ok(probabilities)
    }

    pub fn summary(&self) -> ModelSummary {
        ModelSummary {
            shape: self.shape,
            kind: self.classifier.kind(),
            n_features: self.n_features(),
            classes: self.class_labels().to_vec(),
            has_label_encoder: self.label_encoder.is_some(),
            has_scaler: self.scaler.is_some(),
            feature_names: self.feature_names.clone(),
        }
    }
}
