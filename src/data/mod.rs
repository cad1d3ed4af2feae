//! Data domain: discovering originals and pairing them with adversarial counterparts.

pub mod domain;
pub mod repo_fs;
pub mod service;

pub use domain::{ImageExtensions, ImagePair, MatchRule, PairRepo, Resolution};
