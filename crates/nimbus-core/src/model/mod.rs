//! # Model Artifacts
//!
//! A trained classifier is shipped as a single JSON artifact. The artifact is
//! either a bundle (`{"model": .., "label_encoder": .., "scaler": ..,
//! "feature_names": ..}`) or a bare classifier object. Either way it is loaded
//! once into a [`ModelBundle`] and only ever read afterwards.
//!
//! ## Classifiers
//!
//! - [`LogisticRegression`]: multinomial (softmax) or one-vs-rest linear model
//! - [`GaussianNb`]: Gaussian naive Bayes
//!
//! Anything implementing [`Classifier`] can be wrapped in a bundle, which is
//! how tests plug in fixed-output models.

mod bundle;
mod logistic;
mod naive_bayes;
mod preprocessing;

pub use bundle::{ArtifactShape, ModelBundle, ModelSummary};
pub use logistic::{LogisticRegression, MultiClass};
pub use naive_bayes::GaussianNb;
pub use preprocessing::{LabelEncoder, StandardScaler};

use crate::error::ModelResult;
use serde::{Deserialize, Deserializer};
use std::fmt;

/// A trained probabilistic classifier over a fixed-width numeric input.
pub trait Classifier: fmt::Debug + Send + Sync {
    /// Short identifier of the model family.
    fn kind(&self) -> &'static str;

    /// Number of input features.
    fn n_features(&self) -> usize;

    /// Class labels in output order.
    fn classes(&self) -> &[String];

    /// Probability of each class for one input row.
    ///
    /// Implementations may assume `features.len() == self.n_features()`;
    /// [`ModelBundle`] checks it before calling.
    fn predict_proba(&self, features: &[f64]) -> ModelResult<Vec<f64>>;

    /// Additive per-feature contribution to one class's score.
    ///
    /// Only models with an additive decision function can answer this.
    fn contributions(&self, _features: &[f64], _class_index: usize) -> Option<Vec<f64>> {
        None
    }
}

/// Classifier section of an artifact, tagged by `kind`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub(crate) enum ClassifierSpec {
    LogisticRegression(LogisticRegression),
    GaussianNb(GaussianNb),
}

impl ClassifierSpec {
    pub(crate) fn into_classifier(self) -> ModelResult<Box<dyn Classifier>> {
        match self {
            Self::LogisticRegression(model) => {
                model.validate()?;
                Ok(Box::new(model))
            }
            Self::GaussianNb(model) => {
                model.validate()?;
                Ok(Box::new(model))
            }
        }
    }
}

/// Class labels may be exported as strings or integers.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawLabel {
    Text(String),
    Integer(i64),
}

pub(crate) fn deserialize_labels<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<RawLabel>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|label| match label {
            RawLabel::Text(text) => text,
            RawLabel::Integer(value) => value.to_string(),
        })
        .collect())
}

pub(crate) fn dot(weights: &[f64], features: &[f64]) -> f64 {
    weights.iter().zip(features).map(|(w, x)| w * x).sum()
}

pub(crate) fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// Numerically stable softmax.
pub(crate) fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_softmax_sums_to_one() {
        let probabilities = softmax(&[1.0, 2.0, 3.0]);
        let sum: f64 = probabilities.iter().sum();
        assert!((sum - 1.0).abs() < 1e-12);
        assert!(probabilities[2] > probabilities[1]);
    }

    #[test]
    fn test_softmax_large_scores() {
        let probabilities = softmax(&[1000.0, 1000.0]);
        assert!((probabilities[0] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_sigmoid_symmetry() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-12);
        assert!((sigmoid(4.0) + sigmoid(-4.0) - 1.0).abs() < 1e-12);
        assert!(sigmoid(-800.0) >= 0.0);
    }

    #[test]
    fn test_mixed_labels() {
        #[derive(Deserialize)]
        struct Labels {
            #[serde(deserialize_with = "deserialize_labels")]
            classes: Vec<String>,
        }
        let parsed: Labels = serde_json::from_str(r#"{"classes": [0, "Flu", 2]}"#).unwrap();
        assert_eq!(parsed.classes, vec!["0", "Flu", "2"]);
    }
}
