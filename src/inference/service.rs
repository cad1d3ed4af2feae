//! Classifier runner: one prediction per (pair, classifier).

use std::path::Path;

use image::RgbImage;

use crate::common::error::{EvalError, EvalResult};

use super::domain::{ClassifierHandle, AUTHENTIC_CLASS};

/// Classify the adversarial image and report whether the attack succeeded,
/// i.e. the prediction is the authentic class. Any failure is fatal for the
/// run and names both the classifier and the image.
pub fn attack_succeeded(
    handle: &ClassifierHandle,
    adversarial: &RgbImage,
    rel_path: &Path,
) -> EvalResult<bool> {
    let fail = |err: EvalError| EvalError::Classification {
        classifier: handle.name.clone(),
        rel_path: rel_path.to_path_buf(),
        reason: err.to_string(),
    };

    let input = handle.transform.apply(adversarial).map_err(fail)?;
    let pred = handle.classifier.classify(&input).map_err(fail)?;
    let indicator = pred == AUTHENTIC_CLASS;
    let label = if indicator { "real" } else { "fake" };
    tracing::debug!(
        classifier = %handle.name,
        rel_path = %rel_path.display(),
        pred,
        label,
        indicator,
        "prediction"
    );
    Ok(indicator)
}
