//! Classifier capabilities and the closed set of supported architectures.
//!
//! Network definitions and weight loading live behind [`ModelLoader`]; this
//! crate only decides which preprocessing each architecture gets and what a
//! prediction means.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use image::RgbImage;
use ndarray::Array3;

use crate::common::error::{EvalError, EvalResult};

use super::device::Device;
use super::transforms::{DctTransform, SpatialTransform};

/// Channel-first model input.
pub type Tensor = Array3<f32>;

/// Class index meaning "authentic". A prediction equal to it on an
/// adversarial image counts as a successful attack.
pub const AUTHENTIC_CLASS: usize = 0;

/// Preprocessing applied to an adversarial image before classification.
pub trait Transform: Send + Sync {
    fn apply(&self, image: &RgbImage) -> EvalResult<Tensor>;
}

/// Binary image classifier returning a class index.
pub trait Classifier: Send + Sync {
    fn classify(&self, input: &Tensor) -> EvalResult<usize>;
}

/// Builds classifiers from weight files.
pub trait ModelLoader {
    /// Whether an accelerator can be used for `DeviceChoice::Auto`.
    fn accelerator_available(&self) -> bool {
        false
    }

    fn load(
        &self,
        kind: ClassifierKind,
        weights: &Path,
        device: Device,
    ) -> EvalResult<Box<dyn Classifier>>;
}

/// Index of the largest logit. Ties resolve to the lowest index.
pub fn argmax(logits: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (idx, &v) in logits.iter().enumerate() {
        if v.is_nan() {
            return None;
        }
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((idx, v)),
        }
    }
    best.map(|(idx, _)| idx)
}

/// Supported architectures.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ClassifierKind {
    ResNet50,
    DenseNet121,
    VitB16,
    ResNet18Dct,
    DenseNet121Dct,
}

impl ClassifierKind {
    pub const fn all() -> [ClassifierKind; 5] {
        [
            ClassifierKind::ResNet50,
            ClassifierKind::DenseNet121,
            ClassifierKind::VitB16,
            ClassifierKind::ResNet18Dct,
            ClassifierKind::DenseNet121Dct,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ClassifierKind::ResNet50 => "resnet50",
            ClassifierKind::DenseNet121 => "densenet121",
            ClassifierKind::VitB16 => "vit_b_16",
            ClassifierKind::ResNet18Dct => "resnet18_dct",
            ClassifierKind::DenseNet121Dct => "densenet121_dct",
        }
    }

    /// True for architectures fed with the frequency-domain transform.
    pub fn is_frequency(&self) -> bool {
        matches!(
            self,
            ClassifierKind::ResNet18Dct | ClassifierKind::DenseNet121Dct
        )
    }

    /// Preprocessing for this architecture.
    pub fn transform(&self, dct_log_scale: bool) -> Box<dyn Transform> {
        match self {
            ClassifierKind::ResNet18Dct | ClassifierKind::DenseNet121Dct => {
                Box::new(DctTransform::new(dct_log_scale))
            }
            ClassifierKind::VitB16 => Box::new(SpatialTransform::resize_and_crop()),
            ClassifierKind::ResNet50 | ClassifierKind::DenseNet121 => {
                Box::new(SpatialTransform::resize_only())
            }
        }
    }
}

impl fmt::Display for ClassifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClassifierKind {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ClassifierKind::all()
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| EvalError::UnknownClassifier(s.to_string()))
    }
}

/// A named classifier with its preprocessing. Read-only during a run.
pub struct ClassifierHandle {
    pub name: String,
    pub transform: Box<dyn Transform>,
    pub classifier: Box<dyn Classifier>,
}

impl ClassifierHandle {
    pub fn new(
        name: impl Into<String>,
        transform: Box<dyn Transform>,
        classifier: Box<dyn Classifier>,
    ) -> Self {
        Self {
            name: name.into(),
            transform,
            classifier,
        }
    }
}

impl fmt::Debug for ClassifierHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassifierHandle")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
