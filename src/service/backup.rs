use crate::device::Device;
use crate::models::backup_job::BackupJob;
use crate::models::config::setup_config;
use crate::models::error::{BackupError, Result};
use crate::models::transfer::TransferOutcome;
use crate::service::cleanup::{remove_from_device, CleanupReport};
use crate::service::connection::ensure_connected;
use crate::service::size::estimate_backup_size;
use crate::service::stream::stream_from_child;
use crate::utils::progress::{create_spinner, create_transfer_bar};
use chrono::NaiveDateTime;
use log::{info, warn};
use std::fs::{self, File};
use std::path::Path;

#[derive(Debug)]
pub struct BackupSummary {
    pub job: BackupJob,
    pub estimated_size: u64,
    pub outcome: TransferOutcome,
    pub cleanup: Option<CleanupReport>,
}

/// Archive the configured device paths into a single desktop tar file.
///
/// Config problems surface before the device is touched, and a missing
/// device path surfaces before the destination file exists. Device paths
/// are only removed after a transfer that exited cleanly.
pub fn run_backup(
    device: &dyn Device,
    config_file: &Path,
    delete: bool,
    now: NaiveDateTime,
    default_root: &str,
    show_progress: bool,
) -> Result<BackupSummary> {
    let config = setup_config(config_file)?;

    ensure_connected(device)?;

    let job = BackupJob::from_config(&config, now, delete, default_root)?;

    let spinner = show_progress.then(|| create_spinner("Estimating backup size..."));
    let estimate = estimate_backup_size(device, &job.device_root, &job.sources);
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let estimated_size = estimate?;

    if let Some(parent) = job.destination.parent() {
        fs::create_dir_all(parent).map_err(|cause| BackupError::SinkWrite {
            path: parent.to_path_buf(),
            cause,
        })?;
    }
    let mut file = File::create(&job.destination).map_err(|cause| BackupError::SinkWrite {
        path: job.destination.clone(),
        cause,
    })?;

    info!("[Backup] {}", job.destination.display());
    let child = device.spawn_backup(&job.device_root, &job.sources)?;
    let bar = show_progress.then(|| create_transfer_bar(estimated_size, "Backup"));
    let outcome = stream_from_child(child, &mut file, &job.destination, estimated_size, bar.as_ref());
    if let Some(bar) = &bar {
        bar.finish();
    }
    let outcome = outcome?;

    let cleanup = if job.delete_after && outcome.is_success() {
        Some(remove_from_device(device, &job.device_root, &job.sources))
    } else {
        if job.delete_after {
            warn!("Backup did not succeed, leaving device paths in place");
        }
        None
    };

    Ok(BackupSummary {
        job,
        estimated_size,
        outcome,
        cleanup,
    })
}
