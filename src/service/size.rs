use crate::device::{parse, Device};
use crate::models::error::{BackupError, Result};
use log::{debug, error};

/// Approximate byte size of `paths` under `root`, for sizing the progress bar.
///
/// A nonzero exit from the query means at least one path is missing on the
/// device and the whole job stops here.
pub fn estimate_backup_size(device: &dyn Device, root: &str, paths: &[String]) -> Result<u64> {
    let output = device.disk_usage(root, paths)?;
    if !output.success() {
        error!("Size query failed: {}", output.stderr);
        return Err(BackupError::MissingPaths {
            stderr: output.stderr,
        });
    }

    let total = parse::du_total(&output.stdout).ok_or_else(|| BackupError::UnexpectedOutput {
        what: "disk usage",
        output: output.stdout.clone(),
    })?;
    debug!("Estimated backup size: {} bytes", total);
    Ok(total)
}
