use crate::device::Device;
use log::{info, warn};

#[derive(Debug, Default)]
pub struct CleanupReport {
    pub removed: Vec<String>,
    pub failed: Vec<(String, String)>,
}

/// Best-effort removal of each backed-up path; one failure does not stop the rest.
pub fn remove_from_device(device: &dyn Device, root: &str, paths: &[String]) -> CleanupReport {
    info!("Removing {} items from Android device", paths.len());
    let mut report = CleanupReport::default();

    for path in paths {
        let target = format!("{}/{}", root.trim_end_matches('/'), path);
        match device.remove(&target) {
            Ok(output) if output.success() => {
                info!("Removed: {}", path);
                report.removed.push(path.clone());
            }
            Ok(output) => {
                warn!("Error removing {}: {}", path, output.stderr);
                report.failed.push((path.clone(), output.stderr));
            }
            Err(e) => {
                warn!("Error removing {}: {}", path, e);
                report.failed.push((path.clone(), e.to_string()));
            }
        }
    }

    report
}
