//! Run configuration loaded from a YAML file.
//!
//! Validation only checks what can be checked before any model is built:
//! directories exist and at least one classifier is named. Weight files are
//! checked by the classifier registry.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::common::error::{EvalError, EvalResult};
use crate::data::domain::ImageExtensions;
use crate::evaluation::domain::AggregateMode;
use crate::inference::device::DeviceChoice;

fn default_aggregate() -> String {
    "mean".to_string()
}

/// Snapshot of configuration values consumed by the core.
#[derive(Clone, Debug, Deserialize)]
pub struct EvalConfig {
    pub models_dir: PathBuf,
    pub classifiers: Vec<String>,
    pub original_root: PathBuf,
    pub adv_root: PathBuf,
    #[serde(default)]
    pub device: DeviceChoice,
    #[serde(default)]
    pub dct_log_scale: bool,
    #[serde(default = "default_aggregate")]
    pub aggregate: String,
    #[serde(default)]
    pub save_json: Option<PathBuf>,
    #[serde(default)]
    pub image_extensions: Option<Vec<String>>,
}

impl EvalConfig {
    /// Parse a configuration from YAML text.
    pub fn from_yaml_str(raw: &str) -> EvalResult<Self> {
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Read and parse a configuration file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> EvalResult<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .map_err(|e| EvalError::config(format!("cannot read {}: {e}", path.display())))?;
        let cfg = Self::from_yaml_str(&raw)?;
        tracing::info!(path = %path.display(), "loaded configuration");
        Ok(cfg)
    }

    /// Fail fast on anything that would make the run meaningless.
    pub fn validate(&self) -> EvalResult<()> {
        for dir in [&self.original_root, &self.adv_root, &self.models_dir] {
            if !dir.is_dir() {
                return Err(EvalError::MissingDirectory(dir.clone()));
            }
        }
        if self.classifiers.is_empty() {
            return Err(EvalError::config("no classifiers configured"));
        }
        Ok(())
    }

    pub fn aggregate_mode(&self) -> AggregateMode {
        AggregateMode::from_token(&self.aggregate)
    }

    pub fn extensions(&self) -> ImageExtensions {
        match &self.image_extensions {
            Some(list) => ImageExtensions::new(list.iter().map(String::as_str)),
            None => ImageExtensions::default(),
        }
    }
}
