use crate::device::Device;
use crate::models::error::{BackupError, Result};
use log::info;

/// Fail with `NoDevice` unless an authorized device is attached.
pub fn ensure_connected(device: &dyn Device) -> Result<Vec<String>> {
    let state = device.state()?;
    if !state.success() {
        let reported = if state.stderr.is_empty() {
            state.stdout
        } else {
            state.stderr
        };
        return Err(BackupError::NoDevice { state: reported });
    }

    let devices = device.devices()?;
    info!("Connected to: {}", devices.join(", "));
    Ok(devices)
}
