//! Inference domain: classifier capabilities, preprocessing and the runner.

pub mod device;
pub mod domain;
pub mod registry;
pub mod service;
pub mod transforms;

pub use device::{Device, DeviceChoice};
pub use domain::{
    Classifier, ClassifierHandle, ClassifierKind, ModelLoader, Tensor, Transform,
    AUTHENTIC_CLASS,
};
pub use registry::ClassifierRegistry;
