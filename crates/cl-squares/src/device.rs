//! Device enumeration and selection.

use crate::backend::{ComputeBackend, DeviceClass};
use crate::error::{ComputeError, Result};
use tracing::{debug, info};

/// A device chosen for the run, with the names used for logging.
#[derive(Debug)]
pub struct SelectedDevice<D> {
    pub device: D,
    pub device_name: String,
    pub platform_name: String,
}

/// Return the first available device of `class`, scanning platforms in
/// enumeration order.
///
/// Enumeration failures are fatal. A device whose availability query fails
/// is skipped like one that reports unavailable.
pub fn find_first_available<B: ComputeBackend>(
    backend: &B,
    class: DeviceClass,
) -> Result<SelectedDevice<B::Device>> {
    let platforms = backend.platforms()?;
    debug!(
        backend = backend.name(),
        count = platforms.len(),
        "enumerated platforms"
    );

    for platform in &platforms {
        let platform_name = backend.platform_name(platform);
        debug!("Scanning platform: {}", platform_name);

        for device in backend.devices(platform, class)? {
            let device_name = backend.device_name(&device);
            match backend.is_available(&device) {
                Ok(true) => {
                    info!(
                        device = %device_name,
                        platform = %platform_name,
                        "selected {} device",
                        class
                    );
                    return Ok(SelectedDevice {
                        device,
                        device_name,
                        platform_name,
                    });
                }
                Ok(false) => debug!("Skipping unavailable device: {}", device_name),
                Err(e) => debug!("Skipping {}: availability query: {}", device_name, e),
            }
        }
    }

    Err(ComputeError::NoDevice { class })
}
