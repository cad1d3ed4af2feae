//! Compute device selection, resolved once before a run.

use std::fmt;

use serde::Deserialize;

/// Device requested in configuration.
#[derive(Copy, Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum DeviceChoice {
    /// First accelerator when the model backend reports one, else CPU.
    #[default]
    Auto,
    Cpu,
}

/// Concrete device handed to the model loader.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Device {
    Cpu,
    Accelerator(u32),
}

impl DeviceChoice {
    pub fn resolve(self, accelerator_available: bool) -> Device {
        match self {
            DeviceChoice::Auto if accelerator_available => Device::Accelerator(0),
            _ => Device::Cpu,
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Cpu => write!(f, "cpu"),
            Device::Accelerator(idx) => write!(f, "accelerator:{idx}"),
        }
    }
}
