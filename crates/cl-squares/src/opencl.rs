//! [`ComputeBackend`] over OpenCL via the `opencl3` crate.
//!
//! Every `opencl3` handle type releases its native object in `Drop`, which
//! is what gives the runner its exactly-once teardown.

use crate::backend::{ComputeBackend, DeviceClass};
use crate::error::{ComputeError, Resource, Result, Stage};
use opencl3::command_queue::CommandQueue;
use opencl3::context::Context;
use opencl3::device::{
    Device, CL_DEVICE_TYPE_ACCELERATOR, CL_DEVICE_TYPE_ALL, CL_DEVICE_TYPE_CPU, CL_DEVICE_TYPE_GPU,
};
use opencl3::kernel::Kernel;
use opencl3::memory::{Buffer, ClMem, CL_MEM_WRITE_ONLY};
use opencl3::platform::{get_platforms, Platform};
use opencl3::program::Program;
use opencl3::types::{cl_device_type, cl_float, CL_BLOCKING};
use tracing::debug;

/// OpenCL backend. Stateless; all state lives in the handles it returns.
#[derive(Debug, Default, Clone, Copy)]
pub struct OpenClBackend;

impl OpenClBackend {
    pub fn new() -> Self {
        Self
    }
}

fn enumeration(reason: String) -> ComputeError {
    ComputeError::Enumeration { reason }
}

fn device_type(class: DeviceClass) -> cl_device_type {
    match class {
        DeviceClass::Gpu => CL_DEVICE_TYPE_GPU,
        DeviceClass::Cpu => CL_DEVICE_TYPE_CPU,
        DeviceClass::Accelerator => CL_DEVICE_TYPE_ACCELERATOR,
        DeviceClass::All => CL_DEVICE_TYPE_ALL,
    }
}

impl ComputeBackend for OpenClBackend {
    type Platform = Platform;
    type Device = Device;
    type Context = Context;
    type Queue = CommandQueue;
    type Program = Program;
    type Kernel = Kernel;
    type Buffer = Buffer<cl_float>;

    fn name(&self) -> &'static str {
        "opencl"
    }

    fn platforms(&self) -> Result<Vec<Platform>> {
        get_platforms()
            .map_err(|e| enumeration(format!("Failed to get OpenCL platforms: {e}")))
    }

    fn platform_name(&self, platform: &Platform) -> String {
        platform.name().unwrap_or_default()
    }

    fn devices(&self, platform: &Platform, class: DeviceClass) -> Result<Vec<Device>> {
        let ids = platform
            .get_devices(device_type(class))
            .map_err(|e| enumeration(format!("Failed to get {class} devices: {e}")))?;
        Ok(ids.into_iter().map(Device::new).collect())
    }

    fn device_name(&self, device: &Device) -> String {
        device.name().unwrap_or_default()
    }

    fn is_available(&self, device: &Device) -> Result<bool> {
        device
            .available()
            .map_err(|e| enumeration(format!("CL_DEVICE_AVAILABLE query: {e}")))
    }

    fn create_context(&self, device: &Device) -> Result<Context> {
        Context::from_device(device)
            .map_err(|e| ComputeError::resource(Resource::Context, e))
    }

    fn create_queue(&self, context: &Context, _device: &Device) -> Result<CommandQueue> {
        // In-order, no profiling. The context was created from this single
        // device, so its default device is the selected one.
        CommandQueue::create_default_with_properties(context, 0, 0)
            .map_err(|e| ComputeError::resource(Resource::CommandQueue, e))
    }

    fn create_program(&self, context: &Context, source: &str) -> Result<Program> {
        Program::create_from_source(context, source)
            .map_err(|e| ComputeError::resource(Resource::Program, e))
    }

    fn build_program(&self, program: &mut Program, device: &Device) -> Result<()> {
        match program.build(&[device.id()], "") {
            Ok(()) => Ok(()),
            Err(e) => {
                let log = program
                    .get_build_log(device.id())
                    .unwrap_or_else(|log_err| format!("<build log unavailable: {log_err}>"));
                Err(ComputeError::Build {
                    reason: e.to_string(),
                    log,
                })
            }
        }
    }

    fn create_kernel(&self, program: &Program, name: &str) -> Result<Kernel> {
        Kernel::create(program, name)
            .map_err(|e| ComputeError::resource(Resource::Kernel, e))
    }

    fn create_output_buffer(&self, context: &Context, len: usize) -> Result<Buffer<cl_float>> {
        // SAFETY: no host pointer is passed, so the driver owns the storage.
        unsafe {
            Buffer::<cl_float>::create(context, CL_MEM_WRITE_ONLY, len, std::ptr::null_mut())
                .map_err(|e| ComputeError::resource(Resource::Buffer, e))
        }
    }

    fn set_buffer_arg(
        &self,
        kernel: &Kernel,
        index: u32,
        buffer: &Buffer<cl_float>,
    ) -> Result<()> {
        // SAFETY: the kernel's argument `index` is a `global float*`.
        unsafe {
            kernel
                .set_arg(index, &buffer.get())
                .map_err(|e| ComputeError::runtime(Stage::SetArg, e))
        }
    }

    fn enqueue_1d(&self, queue: &CommandQueue, kernel: &Kernel, global_size: usize) -> Result<()> {
        let global = [global_size];
        // SAFETY: `global` outlives the call; null offset and local size let
        // the runtime choose.
        let event = unsafe {
            queue
                .enqueue_nd_range_kernel(
                    kernel.get(),
                    1,
                    std::ptr::null(),
                    global.as_ptr(),
                    std::ptr::null(),
                    &[],
                )
                .map_err(|e| ComputeError::runtime(Stage::Enqueue, e))?
        };
        debug!(global_size, "enqueued kernel");
        drop(event);
        Ok(())
    }

    fn flush(&self, queue: &CommandQueue) -> Result<()> {
        queue
            .flush()
            .map_err(|e| ComputeError::runtime(Stage::Flush, e))
    }

    fn finish(&self, queue: &CommandQueue) -> Result<()> {
        queue
            .finish()
            .map_err(|e| ComputeError::runtime(Stage::Finish, e))
    }

    fn read_buffer(
        &self,
        queue: &CommandQueue,
        buffer: &Buffer<cl_float>,
        dst: &mut [f32],
    ) -> Result<()> {
        // SAFETY: blocking read, `dst` is borrowed for the whole transfer.
        unsafe {
            queue
                .enqueue_read_buffer(buffer, CL_BLOCKING, 0, dst, &[])
                .map_err(|e| ComputeError::runtime(Stage::Readback, e))?;
        }
        Ok(())
    }
}
