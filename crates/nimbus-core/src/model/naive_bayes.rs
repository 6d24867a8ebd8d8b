//! Gaussian naive Bayes classifier.

use super::{Classifier, deserialize_labels};
use crate::error::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Per-class Gaussian likelihoods with class priors.
///
/// `theta` and `var` hold one row per class and one column per feature.
/// `var_smoothing` is added to every variance before evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GaussianNb {
    #[serde(deserialize_with = "deserialize_labels")]
    pub classes: Vec<String>,
    pub class_prior: Vec<f64>,
    pub theta: Vec<Vec<f64>>,
    pub var: Vec<Vec<f64>>,
    #[serde(default)]
    pub var_smoothing: f64,
}

impl GaussianNb {
    pub(crate) fn validate(&self) -> ModelResult<()> {
        let n_classes = self.classes.len();
        if n_classes < 2 {
            return Err(ModelError::invalid(format!(
                "naive Bayes needs at least 2 classes, got {n_classes}"
            )));
        }
        for (name, len) in [
            ("class_prior", self.class_prior.len()),
            ("theta", self.theta.len()),
            ("var", self.var.len()),
        ] {
            if len != n_classes {
                return Err(ModelError::invalid(format!(
                    "{name} has {len} rows for {n_classes} classes"
                )));
            }
        }
        if self.class_prior.iter().any(|p| p.is_nan() || *p <= 0.0) {
            return Err(ModelError::invalid("class priors must be positive"));
        }

        let width = self.theta[0].len();
        if width == 0 {
            return Err(ModelError::invalid("theta rows are empty"));
        }
        let ragged = self
            .theta
            .iter()
            .chain(&self.var)
            .any(|row| row.len() != width);
        if ragged {
            return Err(ModelError::invalid(format!(
                "theta and var rows must all have {width} features"
            )));
        }
        let non_positive = self.var.iter().flatten().any(|v| {
            let smoothed = v + self.var_smoothing;
            smoothed.is_nan() || smoothed <= 0.0
        });
        if non_positive {
            return Err(ModelError::invalid("variances must be positive"));
        }
        Ok(())
    }

    fn joint_log_likelihood(&self, features: &[f64]) -> Vec<f64> {
        self.class_prior
            .iter()
            .zip(self.theta.iter().zip(&self.var))
            .map(|(prior, (means, variances))| {
                let log_likelihood: f64 = features
                    .iter()
                    .zip(means.iter().zip(variances))
                    .map(|(x, (mean, var))| {
                        let var = var + self.var_smoothing;
                        -0.5 * (2.0 * PI * var).ln() - (x - mean).powi(2) / (2.0 * var)
                    })
                    .sum();
                prior.ln() + log_likelihood
            })
            .collect()
    }
}

impl Classifier for GaussianNb {
    fn kind(&self) -> &'static str {
        "gaussian_nb"
    }

    fn n_features(&self) -> usize {
        self.theta.first().map_or(0, Vec::len)
    }

    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn predict_proba(&self, features: &[f64]) -> ModelResult<Vec<f64>> {
        let jll = self.joint_log_likelihood(features);
        let max = jll.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if !max.is_finite() {
            return Err(ModelError::NonFiniteOutput);
        }
        let log_norm = max + jll.iter().map(|l| (l - max).exp()).sum::<f64>().ln();
        Ok(jll.into_iter().map(|l| (l - log_norm).exp()).collect())
    }
}
