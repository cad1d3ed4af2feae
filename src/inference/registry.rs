//! Startup resolution of configured classifier identifiers into handles.

use std::collections::HashSet;
use std::path::PathBuf;

use crate::common::error::{EvalError, EvalResult};

use super::device::Device;
use super::domain::{ClassifierHandle, ClassifierKind, ModelLoader};

/// Weight file extension expected under `models_dir`.
pub const WEIGHTS_EXT: &str = "pth";

/// Everything needed to turn identifiers into ready classifiers.
#[derive(Clone, Debug)]
pub struct ClassifierRegistry {
    models_dir: PathBuf,
    dct_log_scale: bool,
    device: Device,
}

impl ClassifierRegistry {
    pub fn new(models_dir: impl Into<PathBuf>, dct_log_scale: bool, device: Device) -> Self {
        Self {
            models_dir: models_dir.into(),
            dct_log_scale,
            device,
        }
    }

    pub fn weights_path(&self, name: &str) -> PathBuf {
        self.models_dir.join(format!("{name}.{WEIGHTS_EXT}"))
    }

    /// Resolve every identifier, in order. Unknown identifiers, duplicates and
    /// missing weight files fail before any model is loaded.
    pub fn build(
        &self,
        names: &[String],
        loader: &dyn ModelLoader,
    ) -> EvalResult<Vec<ClassifierHandle>> {
        let mut seen = HashSet::new();
        let mut resolved = Vec::with_capacity(names.len());
        for name in names {
            let kind: ClassifierKind = name.parse()?;
            if !seen.insert(kind) {
                return Err(EvalError::config(format!(
                    "classifier '{name}' listed more than once"
                )));
            }
            let weights = self.weights_path(name);
            if !weights.is_file() {
                return Err(EvalError::WeightsMissing {
                    name: name.clone(),
                    path: weights,
                });
            }
            resolved.push((kind, weights));
        }

        let mut handles = Vec::with_capacity(resolved.len());
        for (kind, weights) in resolved {
            tracing::info!(
                classifier = %kind,
                weights = %weights.display(),
                device = %self.device,
                "loading classifier"
            );
            let classifier = loader.load(kind, &weights, self.device)?;
            handles.push(ClassifierHandle::new(
                kind.as_str(),
                kind.transform(self.dct_log_scale),
                classifier,
            ));
        }
        tracing::info!(count = handles.len(), "classifiers loaded");
        Ok(handles)
    }
}
