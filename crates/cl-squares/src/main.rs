//! Prints the squares of 0..32 computed by an OpenCL kernel on the first
//! available GPU.
//!
//! Build with `--features opencl-runtime`; without it the binary only
//! reports that no compute backend was compiled in.

use anyhow::{Context, Result};
use cl_squares::error::{EXIT_GENERIC_FAIL, EXIT_SUCCESS};
use cl_squares::{write_values, ComputeError, RunReport};
use std::process::ExitCode;
use tracing::info;

fn main() -> ExitCode {
    // Logs go to stderr; stdout carries only the result line.
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match try_main() {
        Ok(()) => ExitCode::from(EXIT_SUCCESS as u8),
        Err(e) => {
            eprintln!("Error: {e:?}");
            let code = e
                .downcast_ref::<ComputeError>()
                .map_or(EXIT_GENERIC_FAIL, ComputeError::exit_code);
            ExitCode::from(code as u8)
        }
    }
}

fn try_main() -> Result<()> {
    let report = run().context("compute run failed")?;
    info!(
        device = %report.device_name,
        platform = %report.platform_name,
        "run finished"
    );
    write_values(std::io::stdout().lock(), &report.values)
        .context("failed to write output")?;
    Ok(())
}

#[cfg(feature = "opencl-runtime")]
fn run() -> cl_squares::Result<RunReport> {
    cl_squares::ComputeRunner::new(cl_squares::OpenClBackend::new()).run()
}

#[cfg(not(feature = "opencl-runtime"))]
fn run() -> cl_squares::Result<RunReport> {
    Err(ComputeError::BackendUnavailable(
        "built without the `opencl-runtime` feature; rebuild with \
         `cargo build --features opencl-runtime`"
            .into(),
    ))
}
