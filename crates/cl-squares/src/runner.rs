//! The compute workflow: select a device, build the kernel, dispatch it
//! once, wait, and read the result back.

use crate::backend::ComputeBackend;
use crate::config::RunConfig;
use crate::device::find_first_available;
use crate::error::{ComputeError, Result};
use crate::kernels::{reference_squares, SQUARE_KERNEL};
use tracing::{debug, error, info, warn};

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub device_name: String,
    pub platform_name: String,
    pub values: Vec<f32>,
}

/// Runs one kernel launch against a [`ComputeBackend`].
pub struct ComputeRunner<B> {
    backend: B,
    config: RunConfig,
}

impl<B: ComputeBackend> ComputeRunner<B> {
    pub fn new(backend: B) -> Self {
        Self::with_config(backend, RunConfig::default())
    }

    pub fn with_config(backend: B, config: RunConfig) -> Self {
        Self { backend, config }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Execute the workflow.
    ///
    /// Handles are locals declared in creation order. On success they are
    /// released explicitly as buffer, kernel, program, queue, context; on an
    /// early `?` return the same reverse order falls out of drop order.
    pub fn run(&self) -> Result<RunReport> {
        self.config.validate()?;
        let backend = &self.backend;
        let cfg = &self.config;

        let selected = find_first_available(backend, cfg.device_class)?;
        let device = &selected.device;

        let context = backend.create_context(device)?;
        let queue = backend.create_queue(&context, device)?;

        let mut program = backend.create_program(&context, cfg.kernel.source)?;
        if let Err(e) = backend.build_program(&mut program, device) {
            // The log travels in the returned error; only its size is logged.
            if let ComputeError::Build { log, .. } = &e {
                error!(
                    kernel = cfg.kernel.name,
                    log_lines = log.lines().count(),
                    "program build failed"
                );
            }
            return Err(e);
        }
        debug!(kernel = cfg.kernel.name, "program built");

        let kernel = backend.create_kernel(&program, cfg.kernel.name)?;
        let buffer = backend.create_output_buffer(&context, cfg.work_size)?;
        debug!(bytes = cfg.buffer_bytes(), "allocated output buffer");

        backend.set_buffer_arg(&kernel, 0, &buffer)?;
        backend.enqueue_1d(&queue, &kernel, cfg.work_size)?;
        backend.flush(&queue)?;
        backend.finish(&queue)?;

        let mut values = vec![0.0f32; cfg.work_size];
        backend.read_buffer(&queue, &buffer, &mut values)?;
        info!(
            work_items = cfg.work_size,
            device = %selected.device_name,
            "kernel completed"
        );

        if cfg.kernel == SQUARE_KERNEL && values != reference_squares(cfg.work_size) {
            warn!("device output differs from the host reference");
        }

        drop(buffer);
        drop(kernel);
        drop(program);
        drop(queue);
        drop(context);
        debug!("released buffer, kernel, program, queue, context");

        Ok(RunReport {
            device_name: selected.device_name,
            platform_name: selected.platform_name,
            values,
        })
    }
}
