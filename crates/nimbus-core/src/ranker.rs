//! Diagnosis ranking
//!
//! Converts per-class probabilities into the short, ordered list of
//! diagnoses returned to clients.

use crate::error::RankError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse confidence bucket derived from a rounded percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceBand {
    High,
    Medium,
    Low,
}

impl ConfidenceBand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for ConfidenceBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ranked candidate condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnosis {
    pub condition: String,
    /// Rounded percentage, 0 to 100.
    pub probability: u32,
    pub confidence: ConfidenceBand,
}

/// A ranked diagnosis together with the class position it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedClass {
    pub class_index: usize,
    pub diagnosis: Diagnosis,
}

/// Thresholds and limits applied by [`DiagnosisRanker`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankerConfig {
    /// Percentages must be strictly above this to be reported.
    pub inclusion_floor_pct: f64,
    /// Rounded percentages strictly above this are `high`.
    pub high_above: u32,
    /// Rounded percentages strictly above this are `medium`.
    pub medium_above: u32,
    pub max_results: usize,
}

impl Default for RankerConfig {
    fn default() -> Self {
        Self {
            inclusion_floor_pct: 1.0,
            high_above: 60,
            medium_above: 30,
            max_results: 5,
        }
    }
}

/// Filters, bands, sorts and truncates class probabilities.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiagnosisRanker {
    config: RankerConfig,
}

impl DiagnosisRanker {
    pub fn new(config: RankerConfig) -> Self {
        Self { config }
    }

    /// Band for a rounded percentage.
    pub fn band(&self, percentage: u32) -> ConfidenceBand {
        if percentage > self.config.high_above {
            ConfidenceBand::High
        } else if percentage > self.config.medium_above {
            ConfidenceBand::Medium
        } else {
            ConfidenceBand::Low
        }
    }

    /// Rank parallel label and probability sequences.
    ///
    /// Entries at or below the inclusion floor are dropped before rounding,
    /// and entries whose rounded value is still at or below the floor are
    /// dropped after it. Ties keep the order the classes were given in.
    pub fn rank<L: AsRef<str>>(
        &self,
        labels: &[L],
        probabilities: &[f64],
    ) -> Result<Vec<Diagnosis>, RankError> {
        Ok(self
            .rank_indexed(labels, probabilities)?
            .into_iter()
            .map(|ranked| ranked.diagnosis)
            .collect())
    }

    /// Same as [`Self::rank`], keeping each entry's class position.
    pub fn rank_indexed<L: AsRef<str>>(
        &self,
        labels: &[L],
        probabilities: &[f64],
    ) -> Result<Vec<RankedClass>, RankError> {
        if labels.len() != probabilities.len() {
            return Err(RankError::LengthMismatch {
                labels: labels.len(),
                probabilities: probabilities.len(),
            });
        }

        let mut ranked: Vec<RankedClass> = labels
            .iter()
            .zip(probabilities)
            .enumerate()
            .filter_map(|(class_index, (label, probability))| {
                let percentage = probability * 100.0;
                if percentage.is_nan() || percentage <= self.config.inclusion_floor_pct {
                    return None;
                }
                let rounded = round_percentage(percentage);
                if f64::from(rounded) <= self.config.inclusion_floor_pct {
                    return None;
                }
                Some(RankedClass {
                    class_index,
                    diagnosis: Diagnosis {
                        condition: label.as_ref().to_string(),
                        probability: rounded,
                        confidence: self.band(rounded),
                    },
                })
            })
            .collect();

        // sort_by is stable
        ranked.sort_by(|a, b| b.diagnosis.probability.cmp(&a.diagnosis.probability));
        ranked.truncate(self.config.max_results);
        Ok(ranked)
    }
}

/// Round half to even, clamped to 0..=100.
fn round_percentage(percentage: f64) -> u32 {
    percentage.round_ties_even().clamp(0.0, 100.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn ranker() -> DiagnosisRanker {
        DiagnosisRanker::default()
    }

    #[rstest]
    #[case(100, ConfidenceBand::High)]
    #[case(61, ConfidenceBand::High)]
    #[case(60, ConfidenceBand::Medium)]
    #[case(31, ConfidenceBand::Medium)]
    #[case(30, ConfidenceBand::Low)]
    #[case(2, ConfidenceBand::Low)]
    fn test_band_boundaries(#[case] percentage: u32, #[case] expected: ConfidenceBand) {
        assert_eq!(ranker().band(percentage), expected);
    }

    #[test]
    fn test_reference_scenario() {
        let labels = ["Flu", "Cold", "Allergy", "COVID", "Other"];
        let probabilities = [0.7, 0.2, 0.05, 0.03, 0.02];
        let ranked = ranker().rank(&labels, &probabilities).unwrap();

        let summary: Vec<(&str, u32, ConfidenceBand)> = ranked
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
    }

    #[test]
    fn test_inclusion_floor() {
        let labels = ["a", "b", "c", "d"];
        let probabilities = [0.015, 0.009, 0.01, 0.012];
        let ranked = ranker().rank(&labels, &probabilities).unwrap();

        // 1.5% rounds to 2 and stays; 0.9% and 1.0% never pass the floor;
        // 1.2% passes the floor but rounds to 1.
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].condition, "a");
        assert_eq!(ranked[0].probability, 2);
    }

    #[test]
    fn test_half_rounds_to_even() {
        let ranked = ranker().rank(&["a", "b"], &[0.125, 0.375]).unwrap();
        assert_eq!(ranked[0].condition, "b");
        assert_eq!(ranked[0].probability, 38);
        assert_eq!(ranked[1].probability, 12);
    }

    #[test]
    fn test_truncates_to_five_sorted() {
        let labels = ["a", "b", "c", "d", "e", "f", "g"];
        let probabilities = [0.05, 0.10, 0.30, 0.02, 0.25, 0.08, 0.20];
        let ranked = ranker().rank(&labels, &probabilities).unwrap();

        let names: Vec<&str> = ranked.iter().map(|d| d.condition.as_str()).collect();
        assert_eq!(names, vec!["c", "e", "g", "b", "f"]);
    }

    #[test]
    fn test_ties_keep_class_order() {
        let labels = ["Dengue", "Zika", "Chikungunya"];
        // all three round to 33
        let probabilities = [0.3336, 0.334, 0.3324];
        let ranked = ranker().rank(&labels, &probabilities).unwrap();

        let names: Vec<&str> = ranked.iter().map(|d| d.condition.as_str()).collect();
        assert_eq!(names, vec!["Dengue", "Zika", "Chikungunya"]);
        assert!(ranked.iter().all(|d| d.probability == 33));
    }

    #[test]
    fn test_rank_indexed_keeps_positions() {
        let ranked = ranker()
            .rank_indexed(&["a", "b", "c"], &[0.1, 0.0, 0.9])
            .unwrap();
        let positions: Vec<usize> = ranked.iter().map(|r| r.class_index).collect();
        assert_eq!(positions, vec![2, 0]);
    }

    #[test]
    fn test_nan_probability_is_dropped() {
        let ranked = ranker().rank(&["a", "b"], &[f64::NAN, 0.5]).unwrap();
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].condition, "b");
    }

    #[test]
    fn test_length_mismatch() {
        let err = ranker().rank(&["a"], &[0.5, 0.5]).unwrap_err();
        assert_eq!(
            err,
            RankError::LengthMismatch {
                labels: 1,
                probabilities: 2
            }
        );
    }

    #[test]
    fn test_custom_limits() {
        let ranker = DiagnosisRanker::new(RankerConfig {
            max_results: 2,
            ..RankerConfig::default()
        });
        let ranked = ranker.rank(&["a", "b", "c"], &[0.2, 0.3, 0.5]).unwrap();
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].condition, "c");
    }

    #[test]
    fn test_band_serializes_lowercase() {
        let json = serde_json::to_string(&ConfidenceBand::Medium).unwrap();
        assert_eq!(json, r#""medium""#);
    }
}
