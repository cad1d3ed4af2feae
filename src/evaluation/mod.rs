//! Evaluation: aggregation of attack indicators weighted by similarity, and reporting.

pub mod domain;
pub mod repo_fs;
pub mod report;
pub mod service;

pub use domain::{AggregateMode, Aggregator, ClassifierStats, FinalizedRun, RunningStats};
pub use report::{ClassifierReport, Report};
pub use service::{evaluate_pairs, run};
