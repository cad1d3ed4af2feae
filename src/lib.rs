// lib.rs - central orchestrator
pub mod common;
pub mod data;
pub mod evaluation;
pub mod inference;
pub mod similarity;

pub use common::{EvalConfig, EvalError, EvalResult};
pub use evaluation::{evaluate_pairs, run, AggregateMode, Report};
pub use inference::{Classifier, ClassifierHandle, ClassifierKind, ModelLoader, Transform};
