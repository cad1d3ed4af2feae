//! Image pair definitions and the recognized extension set.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::common::error::EvalResult;

/// Extensions recognized when no override is configured.
pub const DEFAULT_IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "bmp", "tiff"];

/// Matched original/adversarial files. Identity is `relative_path`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ImagePair {
    pub relative_path: PathBuf,
    pub original_path: PathBuf,
    pub adversarial_path: PathBuf,
}

impl ImagePair {
    pub fn new(
        relative_path: impl Into<PathBuf>,
        original_path: impl Into<PathBuf>,
        adversarial_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            relative_path: relative_path.into(),
            original_path: original_path.into(),
            adversarial_path: adversarial_path.into(),
        }
    }
}

/// How an adversarial counterpart was found.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum MatchRule {
    /// Same relative path, same extension.
    Exact,
    /// Same stem in the sibling directory, any extension.
    Stem,
}

/// Case-insensitive set of file extensions, stored without the leading dot.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ImageExtensions(BTreeSet<String>);

impl ImageExtensions {
    pub fn new<'a>(exts: impl IntoIterator<Item = &'a str>) -> Self {
        Self(
            exts.into_iter()
                .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
                .filter(|e| !e.is_empty())
                .collect(),
        )
    }

    /// True when the path's extension belongs to the set.
    pub fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| self.0.contains(&e.to_ascii_lowercase()))
            .unwrap_or(false)
    }
}

impl Default for ImageExtensions {
    fn default() -> Self {
        Self::new(DEFAULT_IMAGE_EXTENSIONS)
    }
}

/// Output of the pair resolver: matched pairs in discovery order plus the
/// relative paths of originals that had no counterpart.
#[derive(Clone, Debug, Default)]
pub struct Resolution {
    pub pairs: Vec<ImagePair>,
    pub gaps: Vec<PathBuf>,
}

impl Resolution {
    /// Number of originals that were considered.
    pub fn discovered(&self) -> usize {
        self.pairs.len() + self.gaps.len()
    }
}

/// Storage contract the pair resolver walks.
pub trait PairRepo {
    /// Relative paths of every recognized original, in a deterministic order.
    fn list_originals(&self) -> EvalResult<Vec<PathBuf>>;
    fn original_path(&self, rel: &Path) -> PathBuf;
    /// Adversarial counterpart of `rel`, if any rule matches.
    fn find_counterpart(&self, rel: &Path) -> EvalResult<Option<(PathBuf, MatchRule)>>;
}
