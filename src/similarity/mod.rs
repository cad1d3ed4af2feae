//! Perceptual similarity between an original and its adversarial counterpart.

pub mod domain;
pub mod service;

pub use domain::{SimilarityError, SimilarityScore, SimilarityScorer, SIMILARITY_SENTINEL};
pub use service::{score_pair, ssim_rgb, Ssim};
