//! Linear logistic classifier.

use super::{Classifier, deserialize_labels, dot, sigmoid, softmax};
use crate::error::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};

/// How per-class scores become probabilities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MultiClass {
    /// Softmax over all class scores.
    #[default]
    Multinomial,
    /// Independent sigmoid per class, normalized to sum to one.
    Ovr,
}

/// Logistic regression with one coefficient row per class.
///
/// A two-class model may carry a single row, in which case it scores the
/// second class and the first gets the complement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    #[serde(deserialize_with = "deserialize_labels")]
    pub classes: Vec<String>,
    pub coefficients: Vec<Vec<f64>>,
    pub intercepts: Vec<f64>,
    #[serde(default)]
    pub multi_class: MultiClass,
}

impl LogisticRegression {
    pub(crate) fn validate(&self) -> ModelResult<()> {
        let n_classes = self.classes.len();
        if n_classes < 2 {
            return Err(ModelError::invalid(format!(
                "logistic regression needs at least 2 classes, got {n_classes}"
            )));
        }

        let rows = self.coefficients.len();
        let binary_single_row = n_classes == 2 && rows == 1;
        if !binary_single_row && rows != n_classes {
            return Err(ModelError::invalid(format!(
                "{rows} coefficient rows for {n_classes} classes"
            )));
        }
        if self.intercepts.len() != rows {
            return Err(ModelError::invalid(format!(
                "{} intercepts for {rows} coefficient rows",
                self.intercepts.len()
            )));
        }

        let width = self.coefficients[0].len();
        if width == 0 {
            return Err(ModelError::invalid("coefficient rows are empty"));
        }
        if let Some(row) = self.coefficients.iter().position(|r| r.len() != width) {
            return Err(ModelError::invalid(format!(
                "coefficient row {row} has {} features, expected {width}",
                self.coefficients[row].len()
            )));
        }
        Ok(())
    }

    fn is_single_row(&self) -> bool {
        self.coefficients.len() == 1
    }

    fn scores(&self, features: &[f64]) -> Vec<f64> {
        self.coefficients
            .iter()
            .zip(&self.intercepts)
            .map(|(row, intercept)| dot(row, features) + intercept)
            .collect()
    }
}

impl Classifier for LogisticRegression {
    fn kind(&self) -> &'static str {
        "logistic_regression"
    }

    fn n_features(&self) -> usize {
        self.coefficients.first().map_or(0, Vec::len)
    }

    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn predict_proba(&self, features: &[f64]) -> ModelResult<Vec<f64>> {
        let scores = self.scores(features);

        if self.is_single_row() {
            let positive = sigmoid(scores[0]);
            return Ok(vec![1.0 - positive, positive]);
        }

        let probabilities = match self.multi_class {
            MultiClass::Multinomial => softmax(&scores),
            MultiClass::Ovr => {
                let raw: Vec<f64> = scores.into_iter().map(sigmoid).collect();
                let sum: f64 = raw.iter().sum();
                if sum <= 0.0 {
                    return Err(ModelError::NonFiniteOutput);
                }
                raw.into_iter().map(|p| p / sum).collect()
            }
        };
        Ok(probabilities)
    }

    fn contributions(&self, features: &[f64], class_index: usize) -> Option<Vec<f64>> {
        if self.is_single_row() {
            let sign = match class_index {
                0 => -1.0,
                1 => 1.0,
                _ => return None,
            };
            return Some(
                self.coefficients[0]
                    .iter()
                    .zip(features)
                    .map(|(w, x)| sign * w * x)
                    .collect(),
            );
        }

        let row = self.coefficients.get(class_index)?;
        Some(row.iter().zip(features).map(|(w, x)| w * x).collect())
    }
}
