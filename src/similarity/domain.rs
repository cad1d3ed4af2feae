//! Similarity outcome types.

use image::RgbImage;
use thiserror::Error;

/// Value credited when the similarity cannot be computed.
pub const SIMILARITY_SENTINEL: f64 = 0.0;

/// Reasons a similarity computation failed. Never fatal for a run.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum SimilarityError {
    #[error("dimension mismatch: original {orig:?}, adversarial {adv:?}")]
    DimensionMismatch { orig: (u32, u32), adv: (u32, u32) },

    #[error("image {width}x{height} is smaller than the {window}x{window} window")]
    TooSmall { width: u32, height: u32, window: usize },

    #[error("non-finite similarity")]
    NonFinite,
}

/// Similarity credited to one pair, with the failure reason if the sentinel was used.
#[derive(Clone, Debug, PartialEq)]
pub struct SimilarityScore {
    pub value: f64,
    pub failure: Option<SimilarityError>,
}

impl SimilarityScore {
    pub fn ok(value: f64) -> Self {
        Self {
            value,
            failure: None,
        }
    }

    pub fn failed(err: SimilarityError) -> Self {
        Self {
            value: SIMILARITY_SENTINEL,
            failure: Some(err),
        }
    }
}

impl From<Result<f64, SimilarityError>> for SimilarityScore {
    fn from(res: Result<f64, SimilarityError>) -> Self {
        match res {
            Ok(v) => Self::ok(v),
            Err(e) => Self::failed(e),
        }
    }
}

/// Pairwise similarity capability used by the evaluation loop.
pub trait SimilarityScorer {
    fn score(&self, original: &RgbImage, adversarial: &RgbImage) -> SimilarityScore;
}
