//! Accelerator selection.
//!
//! `CudaProbe` asks the driver; `bool` implements [`AcceleratorProbe`] as a fixed answer.

use std::fmt;

use candle_core::Device;
use serde::{Deserialize, Serialize};

use crate::error::ModelLoadError;

/// Hardware target the model is loaded onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Accelerator {
    Gpu,
    Cpu,
}

impl fmt::Display for Accelerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Accelerator::Gpu => f.write_str("GPU"),
            Accelerator::Cpu => f.write_str("CPU"),
        }
    }
}

impl Accelerator {
    /// Materialize the candle device for this accelerator.
    pub fn device(self, cuda_index: usize) -> Result<Device, ModelLoadError> {
        match self {
            Accelerator::Cpu => Ok(Device::Cpu),
            Accelerator::Gpu => {
                Device::new_cuda(cuda_index).map_err(|e| ModelLoadError::DeviceUnavailable {
                    reason: format!("cuda device {cuda_index}: {e}"),
                })
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DevicePreference {
    /// Use the GPU when the probe finds one, otherwise the CPU.
    #[default]
    Auto,
    Cpu,
    Gpu,
}

pub trait AcceleratorProbe {
    fn gpu_available(&self) -> bool;
}

/// Probes for a usable CUDA device. Always false unless built with the `cuda` feature.
#[derive(Debug, Clone, Copy, Default)]
pub struct CudaProbe {
    pub index: usize,
}

impl AcceleratorProbe for CudaProbe {
    fn gpu_available(&self) -> bool {
        if !candle_core::utils::cuda_is_available() {
            return false;
        }
        match Device::new_cuda(self.index) {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(
                    index = self.index,
                    error = %e,
                    "CUDA compiled in but device unusable"
                );
                false
            }
        }
    }
}

impl AcceleratorProbe for bool {
    fn gpu_available(&self) -> bool {
        *self
    }
}

pub fn select_accelerator(
    preference: DevicePreference,
    probe: &impl AcceleratorProbe,
) -> Result<Accelerator, ModelLoadError> {
    match preference {
        DevicePreference::Cpu => Ok(Accelerator::Cpu),
        DevicePreference::Auto if probe.gpu_available() => Ok(Accelerator::Gpu),
        DevicePreference::Auto => {
            tracing::debug!("no GPU detected, selecting CPU");
            Ok(Accelerator::Cpu)
        }
        DevicePreference::Gpu if probe.gpu_available() => Ok(Accelerator::Gpu),
        DevicePreference::Gpu => Err(ModelLoadError::DeviceUnavailable {
            reason: "GPU requested but none is available".to_string(),
        }),
    }
}
