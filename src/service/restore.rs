use crate::device::Device;
use crate::models::error::{BackupError, Result};
use crate::models::transfer::TransferOutcome;
use crate::service::connection::ensure_connected;
use crate::service::stream::stream_into_child;
use crate::utils::progress::create_transfer_bar;
use log::info;
use std::fs::File;
use std::path::Path;

/// Extract a desktop tar archive onto the device under `root`.
pub fn run_restore(
    device: &dyn Device,
    archive_path: &Path,
    root: &str,
    show_progress: bool,
) -> Result<TransferOutcome> {
    if !archive_path.is_file() {
        return Err(BackupError::FileNotFound {
            path: archive_path.to_path_buf(),
        });
    }

    ensure_connected(device)?;

    let mut file = File::open(archive_path)?;
    let total = file.metadata()?.len();

    info!("[Restore] {} -> {}", archive_path.display(), root);
    let child = device.spawn_restore(root)?;
    let bar = show_progress.then(|| create_transfer_bar(total, "Restore"));
    let outcome = stream_into_child(&mut file, child, total, bar.as_ref());
    if let Some(bar) = &bar {
        bar.finish();
    }
    outcome
}
