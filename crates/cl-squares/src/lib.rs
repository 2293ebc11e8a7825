//! Minimal OpenCL compute runner.
//!
//! Finds the first available GPU, builds a one-line kernel that writes the
//! square of each work-item's global id, launches it over 32 work-items,
//! waits for completion and reads the results back.
//!
//! The native API sits behind [`ComputeBackend`]. `OpenClBackend` is the
//! real implementation and needs the `opencl-runtime` feature, which is off
//! by default so the crate builds without an OpenCL ICD loader. A binary
//! built without it exits with status 6 after reporting the missing
//! backend. To run against a GPU:
//!
//! ```text
//! cargo run -p cl-squares --features opencl-runtime
//! ```

pub mod backend;
pub mod config;
pub mod device;
pub mod error;
pub mod kernels;
#[cfg(feature = "opencl-runtime")]
pub mod opencl;
pub mod output;
pub mod runner;

pub use backend::{ComputeBackend, DeviceClass};
pub use config::RunConfig;
pub use device::{find_first_available, SelectedDevice};
pub use error::{ComputeError, Resource, Result, Stage};
pub use kernels::{reference_squares, KernelSpec, DATA_SIZE, SQUARE_KERNEL};
#[cfg(feature = "opencl-runtime")]
pub use opencl::OpenClBackend;
pub use output::{format_values, write_values};
pub use runner::{ComputeRunner, RunReport};
