use crate::device::Device;
use crate::models::archive_entry::ArchiveEntry;
use crate::models::check_report::{CheckReport, CheckStatus, CheckedEntry};
use crate::models::error::{BackupError, Result};
use crate::service::connection::ensure_connected;
use indicatif::ProgressBar;
use log::{debug, info};
use std::fs::File;
use std::path::Path;
use tar::{Archive, EntryType};

/// List every member of a tar archive with its recorded type and size.
pub fn read_entries(archive_path: &Path) -> Result<Vec<ArchiveEntry>> {
    let archive_error = |cause: std::io::Error| BackupError::ArchiveRead {
        path: archive_path.to_path_buf(),
        cause,
    };

    let file = File::open(archive_path).map_err(archive_error)?;
    let mut archive = Archive::new(file);
    let mut entries = Vec::new();

    for entry in archive.entries().map_err(archive_error)? {
        let entry = entry.map_err(archive_error)?;
        let header = entry.header();
        let path = entry.path().map_err(archive_error)?;
        let is_dir = header.entry_type() == EntryType::Directory;
        let size = header.size().map_err(archive_error)?;
        entries.push(ArchiveEntry::new(&path.to_string_lossy(), is_dir, size));
    }

    Ok(entries)
}

/// Directories pass on existence; files also need an exact size match.
pub fn classify(entry: &ArchiveEntry, device_size: Option<u64>) -> CheckStatus {
    match device_size {
        Some(_) if entry.is_dir => CheckStatus::Pass,
        Some(size) if size == entry.size => CheckStatus::Pass,
        _ => CheckStatus::Fail,
    }
}

/// Compare every archive entry against `<root>/<name>` on the device.
///
/// Never stops on a failing entry. `on_entry` sees each result as it is made.
pub fn check_archive(
    device: &dyn Device,
    archive_path: &Path,
    root: &str,
    progress: Option<&ProgressBar>,
    mut on_entry: impl FnMut(&CheckedEntry),
) -> Result<CheckReport> {
    if !archive_path.is_file() {
        return Err(BackupError::FileNotFound {
            path: archive_path.to_path_buf(),
        });
    }

    ensure_connected(device)?;

    let entries = read_entries(archive_path)?;
    info!("Total items to check: {}", entries.len());
    if let Some(pb) = progress {
        pb.set_length(entries.len() as u64);
    }

    let root = root.trim_end_matches('/');
    let mut report = CheckReport::default();
    for entry in entries {
        let device_path = format!("{}/{}", root, entry.name);
        let device_size = device.file_size(&device_path)?;
        let status = classify(&entry, device_size);
        debug!("{} {} ({:?} on device)", status.label(), device_path, device_size);

        let checked = CheckedEntry {
            entry,
            device_size,
            status,
        };
        on_entry(&checked);
        report.record(checked);

        if let Some(pb) = progress {
            pb.set_message(format!("Passed: {} | Failed: {}", report.passed, report.failed));
            pb.inc(1);
        }
    }

    Ok(report)
}
