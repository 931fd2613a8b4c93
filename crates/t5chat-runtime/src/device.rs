//! Device placement for the generation model.
//!
//! Provides:
//! - [`Device`]: where the model runs (CPU or an NVIDIA GPU)
//! - [`DevicePreference`]: what the operator asked for (`auto`, `cpu`, `cuda`)
//!
//! CUDA is only considered when the `cuda` cargo feature is compiled in and a
//! driver is visible on the host.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Present when the NVIDIA kernel driver is loaded (Linux).
const NVIDIA_DRIVER_PROC: &str = "/proc/driver/nvidia/version";

/// Compute device for inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Device {
    Cpu,
    Cuda,
}

impl Device {
    /// CUDA when available, otherwise CPU.
    pub fn auto() -> Self {
        if Self::cuda_available() {
            Device::Cuda
        } else {
            Device::Cpu
        }
    }

    /// Whether a CUDA device can be used by this build on this host.
    pub fn cuda_available() -> bool {
        cfg!(feature = "cuda") && Path::new(NVIDIA_DRIVER_PROC).exists()
    }

    /// Resolve an operator preference to a concrete device.
    pub fn select(preference: DevicePreference) -> Result<Self, DeviceError> {
        match preference {
            DevicePreference::Auto => Ok(Self::auto()),
            DevicePreference::Cpu => Ok(Device::Cpu),
            DevicePreference::Cuda if Self::cuda_available() => Ok(Device::Cuda),
            DevicePreference::Cuda if !cfg!(feature = "cuda") => {
                Err(DeviceError::NotCompiled("cuda".to_string()))
            }
            DevicePreference::Cuda => Err(DeviceError::CudaUnavailable),
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Cpu => write!(f, "cpu"),
            Device::Cuda => write!(f, "cuda"),
        }
    }
}

/// Requested device, parsed from configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DevicePreference {
    #[default]
    Auto,
    Cpu,
    Cuda,
}

impl FromStr for DevicePreference {
    type Err = DeviceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(DevicePreference::Auto),
            "cpu" => Ok(DevicePreference::Cpu),
            "cuda" | "gpu" => Ok(DevicePreference::Cuda),
            other => Err(DeviceError::Unknown(other.to_string())),
        }
    }
}

/// Errors from device selection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    #[error("unknown device {0:?} (expected auto, cpu or cuda)")]
    Unknown(String),
    #[error("device {0} not compiled (missing cargo feature)")]
    NotCompiled(String),
    #[error("cuda requested but no NVIDIA driver was found")]
    CudaUnavailable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_preferences() {
        assert_eq!("auto".parse(), Ok(DevicePreference::Auto));
        assert_eq!("CPU".parse(), Ok(DevicePreference::Cpu));
        assert_eq!("cuda".parse(), Ok(DevicePreference::Cuda));
        assert_eq!("gpu".parse(), Ok(DevicePreference::Cuda));
        assert_eq!(
            "tpu".parse::<DevicePreference>(),
            Err(DeviceError::Unknown("tpu".to_string()))
        );
    }

    #[test]
    fn cpu_always_selectable() {
        assert_eq!(Device::select(DevicePreference::Cpu), Ok(Device::Cpu));
    }

    #[test]
    fn auto_matches_availability() {
        let expected = if Device::cuda_available() {
            Device::Cuda
        } else {
            Device::Cpu
        };
        assert_eq!(Device::select(DevicePreference::Auto), Ok(expected));
    }

    #[cfg(not(feature = "cuda"))]
    #[test]
    fn cuda_without_feature_is_rejected() {
        assert_eq!(
            Device::select(DevicePreference::Cuda),
            Err(DeviceError::NotCompiled("cuda".to_string()))
        );
    }

    #[test]
    fn device_display() {
        assert_eq!(Device::Cpu.to_string(), "cpu");
        assert_eq!(format!("{}", Device::Cuda), "cuda");
    }
}
