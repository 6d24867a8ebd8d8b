//! Feature scaling and label decoding shipped alongside a classifier.

use super::deserialize_labels;
use crate::error::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};

/// Standardizes each feature as `(x - mean) / scale`.
///
/// A zero scale is treated as one, so constant training columns pass
/// through centred but unscaled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    pub(crate) fn validate(&self) -> ModelResult<()> {
        if self.mean.len() != self.scale.len() {
            return Err(ModelError::invalid(format!(
                "scaler has {} means and {} scales",
                self.mean.len(),
                self.scale.len()
            )));
        }
        if self.mean.iter().chain(&self.scale).any(|v| !v.is_finite()) {
            return Err(ModelError::invalid("scaler values must be finite"));
        }
        Ok(())
    }

    pub fn transform(&self, features: &[f64]) -> ModelResult<Vec<f64>> {
        if features.len() != self.n_features() {
            return Err(ModelError::FeatureMismatch {
                expected: self.n_features(),
                actual: features.len(),
            });
        }
        Ok(features
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (mean, scale))| {
                let scale = if *scale == 0.0 { 1.0 } else { *scale };
                (x - mean) / scale
            })
            .collect())
    }
}

/// Human-readable class names indexed by the classifier's output position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelEncoder {
    #[serde(deserialize_with = "deserialize_labels")]
    pub classes: Vec<String>,
}

impl LabelEncoder {
    pub fn new(classes: Vec<String>) -> Self {
        Self { classes }
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
