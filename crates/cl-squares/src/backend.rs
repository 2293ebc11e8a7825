//! The seam between the compute workflow and a native compute API.
//!
//! [`ComputeBackend`] exposes exactly the native operations the runner
//! needs: enumeration, object creation, build, argument binding, dispatch,
//! synchronization and readback. Handles are associated types; dropping a
//! handle releases the native object, so every handle is released exactly
//! once and in reverse creation order when the runner's scope unwinds.

use crate::error::Result;
use std::fmt;

/// Class of device requested during enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceClass {
    Gpu,
    Cpu,
    Accelerator,
    All,
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gpu => write!(f, "GPU"),
            Self::Cpu => write!(f, "CPU"),
            Self::Accelerator => write!(f, "accelerator"),
            Self::All => write!(f, "any"),
        }
    }
}

/// Native compute API operations used by [`crate::ComputeRunner`].
pub trait ComputeBackend {
    type Platform;
    type Device;
    type Context;
    type Queue;
    type Program;
    type Kernel;
    type Buffer;

    /// Backend name for logging.
    fn name(&self) -> &'static str;

    fn platforms(&self) -> Result<Vec<Self::Platform>>;

    fn platform_name(&self, platform: &Self::Platform) -> String;

    /// Devices of `class` on `platform`.
    fn devices(&self, platform: &Self::Platform, class: DeviceClass) -> Result<Vec<Self::Device>>;

    fn device_name(&self, device: &Self::Device) -> String;

    /// Whether the device reports itself available.
    fn is_available(&self, device: &Self::Device) -> Result<bool>;

    fn create_context(&self, device: &Self::Device) -> Result<Self::Context>;

    /// Create an in-order queue for `device` on `context`.
    fn create_queue(&self, context: &Self::Context, device: &Self::Device) -> Result<Self::Queue>;

    fn create_program(&self, context: &Self::Context, source: &str) -> Result<Self::Program>;

    /// Build `program` for `device`.
    ///
    /// On failure the backend must return [`crate::ComputeError::Build`]
    /// carrying the compiler log.
    fn build_program(&self, program: &mut Self::Program, device: &Self::Device) -> Result<()>;

    fn create_kernel(&self, program: &Self::Program, name: &str) -> Result<Self::Kernel>;

    /// Allocate a write-only buffer of `len` `f32` elements.
    fn create_output_buffer(&self, context: &Self::Context, len: usize) -> Result<Self::Buffer>;

    fn set_buffer_arg(&self, kernel: &Self::Kernel, index: u32, buf: &Self::Buffer) -> Result<()>;

    /// Enqueue a one-dimensional launch of `global_size` work-items.
    fn enqueue_1d(
        &self,
        queue: &Self::Queue,
        kernel: &Self::Kernel,
        global_size: usize,
    ) -> Result<()>;

    fn flush(&self, queue: &Self::Queue) -> Result<()>;

    /// Block until all enqueued work has completed.
    fn finish(&self, queue: &Self::Queue) -> Result<()>;

    /// Blocking copy of the buffer into `dst`.
    fn read_buffer(
        &self,
        queue: &Self::Queue,
        buffer: &Self::Buffer,
        dst: &mut [f32],
    ) -> Result<()>;
}
