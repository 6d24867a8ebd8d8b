//! Static symptom table
//!
//! Maps the symptom identifiers used by the mobile symptom checker onto
//! feature-vector slots. Slots 0 to 4 are contextual and never appear here.
//! Some identifiers are aliases that share a slot; both spellings are kept.

use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};

/// Total number of slots in a feature vector.
pub const FEATURE_COUNT: usize = 50;

/// Number of leading contextual slots (age, gender, temperature, humidity, wind).
pub const CONTEXT_SLOTS: usize = 5;

/// Identifier to slot pairs, in feature order.
const SYMPTOM_SLOTS: &[(&str, usize)] = &[
    ("nausea", 5),
    ("joint_pain", 6),
    ("abdominal_pain", 7),
    ("high_fever", 8),
    ("chills", 9),
    ("fatigue", 10),
    ("runny_nose", 11),
    ("pain_behind_the_eyes", 12),
    ("pain_behind_eyes", 12),
    ("dizziness", 13),
    ("headache", 14),
    ("chest_pain", 15),
    ("vomiting", 16),
    ("cough", 17),
    ("shivering", 18),
    ("asthma_history", 19),
    ("high_cholesterol", 20),
    ("diabetes", 21),
    ("obesity", 22),
    ("hiv_aids", 23),
    ("nasal_polyps", 24),
    ("asthma", 25),
    ("high_blood_pressure", 26),
    ("severe_headache", 27),
    ("weakness", 28),
    ("trouble_seeing", 29),
    ("fever", 30),
    ("body_aches", 31),
    ("sore_throat", 32),
    ("sneezing", 33),
    ("diarrhea", 34),
    ("rapid_breathing", 35),
    ("rapid_heart_rate", 36),
    ("swollen_glands", 38),
    ("rashes", 39),
    ("sinus_headache", 40),
    ("facial_pain", 41),
    ("shortness_of_breath", 42),
    ("reduced_smell_and_taste", 43),
    ("skin_irritation", 44),
    ("itchiness", 45),
    ("throbbing_headache", 46),
    ("confusion", 47),
    ("back_pain", 48),
    ("knee_ache", 49),
];

/// Names of the contextual slots, in slot order.
const CONTEXT_FEATURE_NAMES: [&str; CONTEXT_SLOTS] = [
    "age",
    "gender",
    "temperature_c",
    "humidity",
    "wind_speed_kmh",
];

/// Slot 37 is a second "pain behind the eyes" column with no identifier of its own.
const UNMAPPED_SLOT_NAMES: &[(usize, &str)] = &[(37, "pain_behind_the_eyes_2")];

/// Immutable identifier to slot mapping.
///
/// Iteration and serialization follow feature order, aliases next to the
/// identifier whose slot they share.
#[derive(Debug, Clone)]
pub struct SymptomTable {
    entries: &'static [(&'static str, usize)],
    index: HashMap<&'static str, usize>,
}

impl SymptomTable {
    /// The table shipped with the symptom checker.
    pub fn standard() -> Self {
        Self {
            entries: SYMPTOM_SLOTS,
            index: SYMPTOM_SLOTS.iter().copied().collect(),
        }
    }

    /// Slot for an identifier, if known.
    pub fn slot(&self, symptom_id: &str) -> Option<usize> {
        self.index.get(symptom_id).copied()
    }

    /// Number of identifiers, aliases included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate identifiers and their slots in feature order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, usize)> + '_ {
        self.entries.iter().copied()
    }

    /// Identifiers sharing a slot with at least one other identifier.
    pub fn aliases(&self) -> BTreeMap<usize, Vec<&'static str>> {
        let mut by_slot: BTreeMap<usize, Vec<&'static str>> = BTreeMap::new();
        for (id, slot) in self.iter() {
            by_slot.entry(slot).or_default().push(id);
        }
        by_slot.retain(|_, ids| ids.len() > 1);
        by_slot
    }

    /// One human-readable name per feature slot.
    ///
    /// Used when a model artifact does not carry its own feature names. The
    /// first identifier listed for a slot wins, so aliases do not duplicate.
    pub fn default_feature_names(&self) -> Vec<String> {
        let mut names: Vec<Option<String>> = vec![None; FEATURE_COUNT];
        for (slot, name) in CONTEXT_FEATURE_NAMES.iter().enumerate() {
            names[slot] = Some((*name).to_string());
        }
        for (slot, name) in UNMAPPED_SLOT_NAMES {
            names[*slot] = Some((*name).to_string());
        }
        for (id, slot) in self.iter() {
            if names[slot].is_none() {
                names[slot] = Some(id.to_string());
            }
        }
        names
            .into_iter()
            .enumerate()
            .map(|(slot, name)| name.unwrap_or_else(|| format!("feature_{slot}")))
            .collect()
    }
}

impl Serialize for SymptomTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

impl Default for SymptomTable {
    fn default() -> Self {
        Self::standard()
    }
}
