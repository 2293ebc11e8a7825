//! Run configuration.
//!
//! The program takes no arguments, so the binary always runs with
//! [`RunConfig::default`]. The struct exists so the library can be driven
//! with other device classes or sizes from tests.

use crate::backend::DeviceClass;
use crate::error::{ComputeError, Result};
use crate::kernels::{KernelSpec, DATA_SIZE, SQUARE_KERNEL};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Device class requested during enumeration.
    pub device_class: DeviceClass,
    /// Global work size; also the buffer length in elements.
    pub work_size: usize,
    /// Kernel to build and dispatch. Its only argument is the output buffer.
    pub kernel: KernelSpec,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            device_class: DeviceClass::Gpu,
            work_size: DATA_SIZE,
            kernel: SQUARE_KERNEL,
        }
    }
}

fn invalid(msg: &str) -> ComputeError {
    ComputeError::InvalidConfig(msg.to_owned())
}

impl RunConfig {
    pub fn validate(&self) -> Result<()> {
        if self.work_size == 0 {
            return Err(invalid("work_size must be > 0"));
        }
        if self.kernel.name.is_empty() {
            return Err(invalid("kernel name is empty"));
        }
        if self.kernel.source.trim().is_empty() {
            return Err(invalid("kernel source is empty"));
        }
        Ok(())
    }

    /// Output buffer size in bytes.
    pub fn buffer_bytes(&self) -> usize {
        self.work_size * std::mem::size_of::<f32>()
    }
}
