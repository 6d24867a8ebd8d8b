//! # Nimbus Core
//!
//! Symptom-to-diagnosis pipeline behind the NimbusVita symptom checker.
//!
//! A request's symptom identifiers are encoded into a fixed 50-slot
//! [`FeatureVector`], run through a pre-trained classifier loaded from a
//! [`ModelBundle`], and the resulting class probabilities are turned into a
//! short ranked list of [`Diagnosis`] entries by the [`DiagnosisRanker`].
//!
//! ```rust
//! use nimbus_core::{DiagnosisRanker, ConfidenceBand};
//!
//! let ranked = DiagnosisRanker::default()
//!     .rank(&["Flu", "Cold"], &[0.75, 0.25])
//!     .unwrap();
//! assert_eq!(ranked[0].condition, "Flu");
//! assert_eq!(ranked[0].confidence, ConfidenceBand::High);
//! ```
//!
//! [`DiagnosisService`] ties the pieces together and is what the HTTP runtime
//! shares between requests.

pub mod encoder;
pub mod error;
pub mod explain;
pub mod model;
pub mod ranker;
pub mod service;
pub mod symptoms;

pub use encoder::{ContextDefaults, EncodedSymptoms, FeatureVector, SymptomEncoder};
pub use error::{EncodeError, ModelError, ModelResult, PredictError, RankError};
pub use explain::{ExplainedDiagnosis, FeatureExplanation, MAX_EXPLANATIONS};
pub use model::{
    ArtifactShape, Classifier, GaussianNb, LabelEncoder, LogisticRegression, ModelBundle,
    ModelSummary, MultiClass, StandardScaler,
};
pub use ranker::{ConfidenceBand, Diagnosis, DiagnosisRanker, RankedClass, RankerConfig};
pub use service::{DiagnosisService, ExplainedPrediction, Prediction};
pub use symptoms::{CONTEXT_SLOTS, FEATURE_COUNT, SymptomTable};
