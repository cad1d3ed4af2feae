//! Final report: a projection of a finalized run.
//!
//! The JSON form is
//! `{"final_score", "images_evaluated", "per_classifier": {name: {"attack_success", "mean_ssim"}}}`
//! with classifiers in configured order.

use std::fmt;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use super::domain::{ClassifierStats, FinalizedRun};

/// Per-classifier entry of the JSON report.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ClassifierReport {
    pub attack_success: f64,
    pub mean_ssim: f64,
}

/// Immutable summary of a run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Report {
    pub final_score: f64,
    pub images_evaluated: usize,
    #[serde(serialize_with = "ordered_map")]
    pub per_classifier: Vec<(String, ClassifierReport)>,
    #[serde(skip)]
    pub num_classifiers: usize,
    #[serde(skip)]
    pub pairs_skipped: usize,
}

fn ordered_map<S: Serializer>(
    entries: &[(String, ClassifierReport)],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(entries.len()))?;
    for (name, entry) in entries {
        map.serialize_entry(name, entry)?;
    }
    map.end()
}

impl Report {
    pub fn new(run: &FinalizedRun, pairs_skipped: usize) -> Self {
        Self {
            final_score: run.final_score,
            images_evaluated: run.images_evaluated,
            per_classifier: run
                .per_classifier
                .iter()
                .map(|ClassifierStats { name, attack_success, mean_ssim, .. }| {
                    (
                        name.clone(),
                        ClassifierReport {
                            attack_success: *attack_success,
                            mean_ssim: *mean_ssim,
                        },
                    )
                })
                .collect(),
            num_classifiers: run.num_classifiers,
            pairs_skipped,
        }
    }

    pub fn classifier(&self, name: &str) -> Option<&ClassifierReport> {
        self.per_classifier
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, r)| r)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "SUMMARY")?;
        writeln!(f, "Images evaluated      : {}", self.images_evaluated)?;
        writeln!(f, "Classifiers considered: {}", self.num_classifiers)?;
        writeln!(f, "Final score           : {:.6}", self.final_score)?;
        if self.pairs_skipped > 0 {
            writeln!(f, "Pairs skipped         : {}", self.pairs_skipped)?;
        }
        if self.images_evaluated == 0 {
            writeln!(f, "No valid image pairs found")?;
        }
        for (name, r) in &self.per_classifier {
            writeln!(
                f,
                "[{name:<15}]  attack_success={:.4}  mean_ssim={:.4}",
                r.attack_success, r.mean_ssim
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::domain::{AggregateMode, Aggregator};

    fn sample() -> Report {
        let mut agg = Aggregator::new(
            vec!["zeta".to_string(), "alpha".to_string()],
            AggregateMode::Mean,
        );
        agg.record(0.5, &[true, false]).unwrap();
        Report::new(&agg.finalize(), 1)
    }

    #[test]
    fn json_matches_schema_and_keeps_order() {
        let report = sample();
        let json = report.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        let obj = value.as_object().unwrap();
        let mut keys: Vec<_> = obj.keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, vec!["final_score", "images_evaluated", "per_classifier"]);
        assert_eq!(value["images_evaluated"], 1);
        assert_eq!(value["per_classifier"]["zeta"]["attack_success"], 1.0);
        assert_eq!(value["per_classifier"]["alpha"]["mean_ssim"], 0.5);

        // serialized text follows configured order, not alphabetical
        assert!(json.find("\"zeta\"").unwrap() < json.find("\"alpha\"").unwrap());
        assert!(json.contains("\n  \"final_score\""));
    }

    #[test]
    fn summary_lists_every_classifier() {
        let text = sample().to_string();
        assert!(text.contains("Images evaluated      : 1"));
        assert!(text.contains("Classifiers considered: 2"));
        assert!(text.contains("Final score           : 0.250000"));
        assert!(text.contains("Pairs skipped         : 1"));
        assert!(text.contains("[zeta           ]  attack_success=1.0000  mean_ssim=0.5000"));
        assert!(text.contains("[alpha          ]  attack_success=0.0000"));
    }

    #[test]
    fn empty_run_reports_no_classifiers() {
        let run = Aggregator::new(vec!["a".to_string()], AggregateMode::Mean).finalize();
        let report = Report::new(&run, 3);
        assert!(report.per_classifier.is_empty());
        assert!(report.to_string().contains("No valid image pairs found"));
        let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(value["final_score"], 0.0);
        assert!(value["per_classifier"].as_object().unwrap().is_empty());
    }
}
