//! Score aggregation across pairs and classifiers.
//!
//! [`Aggregator`] accumulates while pairs are evaluated and is consumed by
//! [`Aggregator::finalize`], so a finalized run cannot be mutated.

use crate::common::error::{EvalError, EvalResult};

/// How the running total becomes the final score.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum AggregateMode {
    /// Divide by `pairs * classifiers`.
    Mean,
    /// Keep the raw sum.
    Sum,
}

impl AggregateMode {
    /// `"mean"` in any case selects [`AggregateMode::Mean`]; every other token is a raw sum.
    pub fn from_token(token: &str) -> Self {
        if token.eq_ignore_ascii_case("mean") {
            AggregateMode::Mean
        } else {
            AggregateMode::Sum
        }
    }
}

/// (similarity, indicator) samples of one classifier.
#[derive(Clone, Debug, Default)]
pub struct RunningStats {
    samples: Vec<(f64, bool)>,
}

impl RunningStats {
    fn push(&mut self, similarity: f64, indicator: bool) {
        self.samples.push((similarity, indicator));
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Fraction of samples where the attack succeeded; 0.0 when empty.
    pub fn attack_success(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let hits = self.samples.iter().filter(|(_, ind)| *ind).count();
        hits as f64 / self.samples.len() as f64
    }

    /// Mean similarity over samples; 0.0 when empty.
    pub fn mean_similarity(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().map(|(s, _)| s).sum::<f64>() / self.samples.len() as f64
    }
}

/// Finalized statistics of one classifier.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassifierStats {
    pub name: String,
    pub attack_success: f64,
    pub mean_ssim: f64,
    pub samples: usize,
}

/// Snapshot produced by [`Aggregator::finalize`].
#[derive(Clone, Debug, PartialEq)]
pub struct FinalizedRun {
    pub mode: AggregateMode,
    pub final_score: f64,
    pub running_total: f64,
    pub images_evaluated: usize,
    pub num_classifiers: usize,
    /// Empty when no pair was evaluated.
    pub per_classifier: Vec<ClassifierStats>,
}

/// Accumulating phase of the aggregation.
#[derive(Debug)]
pub struct Aggregator {
    mode: AggregateMode,
    names: Vec<String>,
    stats: Vec<RunningStats>,
    running_total: f64,
    pairs: usize,
}

impl Aggregator {
    pub fn new(names: Vec<String>, mode: AggregateMode) -> Self {
        let stats = vec![RunningStats::default(); names.len()];
        Self {
            mode,
            names,
            stats,
            running_total: 0.0,
            pairs: 0,
        }
    }

    pub fn pairs(&self) -> usize {
        self.pairs
    }

    /// Fold one scored pair. `indicators` follows the classifier order given
    /// to [`Aggregator::new`]. Returns the pair's contribution to the total.
    pub fn record(&mut self, similarity: f64, indicators: &[bool]) -> EvalResult<f64> {
        if indicators.len() != self.stats.len() {
            return Err(EvalError::Internal(format!(
                "expected {} indicators, got {}",
                self.stats.len(),
                indicators.len()
            )));
        }
        let mut contribution = 0.0;
        for (stats, &ind) in self.stats.iter_mut().zip(indicators) {
            stats.push(similarity, ind);
            if ind {
                contribution += similarity;
            }
        }
        self.running_total += contribution;
        self.pairs += 1;
        Ok(contribution)
    }

    pub fn finalize(self) -> FinalizedRun {
        let num_classifiers = self.names.len();
        if self.pairs == 0 {
            return FinalizedRun {
                mode: self.mode,
                final_score: 0.0,
                running_total: 0.0,
                images_evaluated: 0,
                num_classifiers,
                per_classifier: Vec::new(),
            };
        }

        let final_score = match self.mode {
            AggregateMode::Mean => {
                self.running_total / (self.pairs * num_classifiers.max(1)) as f64
            }
            AggregateMode::Sum => self.running_total,
        };
        let per_classifier = self
            .names
            .into_iter()
            .zip(&self.stats)
            .map(|(name, s)| ClassifierStats {
                name,
                attack_success: s.attack_success(),
                mean_ssim: s.mean_similarity(),
                samples: s.len(),
            })
            .collect();

        FinalizedRun {
            mode: self.mode,
            final_score,
            running_total: self.running_total,
            images_evaluated: self.pairs,
            num_classifiers,
            per_classifier,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("clf{i}")).collect()
    }

    fn uniform_run(mode: AggregateMode, pairs: usize, classifiers: usize, s: f64) -> FinalizedRun {
        let mut agg = Aggregator::new(names(classifiers), mode);
        let all_fooled = vec![true; classifiers];
        for _ in 0..pairs {
            agg.record(s, &all_fooled).unwrap();
        }
        agg.finalize()
    }

    #[test]
    fn mode_token_is_case_insensitive() {
        assert_eq!(AggregateMode::from_token("mean"), AggregateMode::Mean);
        assert_eq!(AggregateMode::from_token("MEAN"), AggregateMode::Mean);
        assert_eq!(AggregateMode::from_token("sum"), AggregateMode::Sum);
        assert_eq!(AggregateMode::from_token(""), AggregateMode::Sum);
    }

    #[test]
    fn mean_mode_normalizes_out_pairs_and_classifiers() {
        for (p, c) in [(1, 1), (4, 3), (10, 5)] {
            let run = uniform_run(AggregateMode::Mean, p, c, 0.72);
            assert_relative_eq!(run.final_score, 0.72, epsilon = 1e-12);
        }
    }

    #[test]
    fn sum_mode_keeps_the_raw_total() {
        let run = uniform_run(AggregateMode::Sum, 4, 3, 0.5);
        assert_relative_eq!(run.final_score, 0.5 * 4.0 * 3.0, epsilon = 1e-12);
    }

    #[test]
    fn zero_pairs_yield_zero_score_and_no_statistics() {
        let run = Aggregator::new(names(2), AggregateMode::Mean).finalize();
        assert_eq!(run.final_score, 0.0);
        assert_eq!(run.images_evaluated, 0);
        assert_eq!(run.num_classifiers, 2);
        assert!(run.per_classifier.is_empty());
    }

    #[test]
    fn attack_success_bounds() {
        let mut agg = Aggregator::new(names(2), AggregateMode::Mean);
        for s in [0.3, 0.6, 0.9] {
            agg.record(s, &[false, true]).unwrap();
        }
        let run = agg.finalize();
        assert_eq!(run.per_classifier[0].attack_success, 0.0);
        assert_eq!(run.per_classifier[1].attack_success, 1.0);
        assert_relative_eq!(run.per_classifier[0].mean_ssim, 0.6, epsilon = 1e-12);
    }

    #[test]
    fn contribution_only_counts_fooled_classifiers() {
        let mut agg = Aggregator::new(names(3), AggregateMode::Sum);
        let c = agg.record(0.8, &[true, false, true]).unwrap();
        assert_relative_eq!(c, 1.6, epsilon = 1e-12);
        assert_eq!(agg.pairs(), 1);
    }

    #[test]
    fn indicator_count_must_match_classifiers() {
        let mut agg = Aggregator::new(names(2), AggregateMode::Mean);
        assert!(agg.record(0.5, &[true]).is_err());
        assert_eq!(agg.pairs(), 0);
    }

    #[test]
    fn empty_stats_are_zero() {
        let stats = RunningStats::default();
        assert!(stats.is_empty());
        assert_eq!(stats.attack_success(), 0.0);
        assert_eq!(stats.mean_similarity(), 0.0);
    }
}
