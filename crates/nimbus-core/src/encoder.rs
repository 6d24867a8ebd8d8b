//! Symptom encoder
//!
//! Turns a list of symptom identifiers into the fixed 50-slot feature vector
//! the classifier was trained on. Contextual slots are filled from
//! [`ContextDefaults`]; symptom slots are presence flags.

use crate::error::EncodeError;
use crate::symptoms::{FEATURE_COUNT, SymptomTable};
use serde::Serialize;

/// Contextual values written to slots 0 to 4.
///
/// Requests do not carry patient or weather data, so every vector uses the
/// same defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ContextDefaults {
    pub age: f64,
    pub gender: f64,
    pub temperature_c: f64,
    pub humidity: f64,
    pub wind_speed_kmh: f64,
}

impl ContextDefaults {
    pub fn as_slots(&self) -> [f64; 5] {
        [
            self.age,
            self.gender,
            self.temperature_c,
            self.humidity,
            self.wind_speed_kmh,
        ]
    }
}

impl Default for ContextDefaults {
    fn default() -> Self {
        Self {
            age: 30.0,
            gender: 0.0,
            temperature_c: 37.0,
            humidity: 60.0,
            wind_speed_kmh: 10.0,
        }
    }
}

/// Fixed-length classifier input.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    /// All-zero vector.
    pub fn zeros() -> Self {
        Self([0.0; FEATURE_COUNT])
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn get(&self, slot: usize) -> Option<f64> {
        self.0.get(slot).copied()
    }

    /// Slots currently holding a non-zero value.
    pub fn active_slots(&self) -> impl Iterator<Item = usize> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, value)| **value != 0.0)
            .map(|(slot, _)| slot)
    }

    fn set(&mut self, slot: usize, value: f64) {
        if let Some(cell) = self.0.get_mut(slot) {
            *cell = value;
        }
    }
}

impl AsRef<[f64]> for FeatureVector {
    fn as_ref(&self) -> &[f64] {
        &self.0
    }
}

/// Result of encoding one request.
#[derive(Debug, Clone)]
pub struct EncodedSymptoms {
    pub vector: FeatureVector,
    /// Identifiers that matched the table, in request order.
    pub recognized: Vec<String>,
    /// Identifiers that were dropped.
    pub ignored: Vec<String>,
}

/// Maps symptom identifiers onto a [`FeatureVector`].
#[derive(Debug, Clone, Default)]
pub struct SymptomEncoder {
    table: SymptomTable,
    context: ContextDefaults,
}

impl SymptomEncoder {
    pub fn new(table: SymptomTable, context: ContextDefaults) -> Self {
        Self { table, context }
    }

    pub fn table(&self) -> &SymptomTable {
        &self.table
    }

    /// Encode a list of symptom identifiers.
    ///
    /// Unknown identifiers are ignored. An empty list is rejected before any
    /// vector is built.
    pub fn encode<S: AsRef<str>>(&self, symptoms: &[S]) -> Result<EncodedSymptoms, EncodeError> {
        if symptoms.is_empty() {
            return Err(EncodeError::NoSymptoms);
        }

        let mut vector = FeatureVector::zeros();
        for (slot, value) in self.context.as_slots().into_iter().enumerate() {
            vector.set(slot, value);
        }

        let mut recognized = Vec::with_capacity(symptoms.len());
        let mut ignored = Vec::new();
        for symptom in symptoms {
            let id = symptom.as_ref();
            match self.table.slot(id) {
                Some(slot) => {
                    vector.set(slot, 1.0);
                    recognized.push(id.to_string());
                }
                None => ignored.push(id.to_string()),
            }
        }

        if !ignored.is_empty() {
            tracing::debug!(
                ignored = ?ignored,
                recognized = recognized.len(),
                "Ignoring unknown symptom identifiers"
            );
        }

        Ok(EncodedSymptoms {
            vector,
            recognized,
            ignored,
        })
    }
}
