use crate::models::config::{resolve_output, Config};
use crate::models::error::{BackupError, Result};
use chrono::NaiveDateTime;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct BackupJob {
    pub destination: PathBuf,
    pub sources: Vec<String>,
    pub device_root: String,
    pub delete_after: bool,
}

impl BackupJob {
    pub fn from_config(
        config: &Config,
        now: NaiveDateTime,
        delete_after: bool,
        default_root: &str,
    ) -> Result<Self> {
        let device_root = config.device_root(default_root);
        let sources = config
            .paths
            .iter()
            .map(|path| relative_to_root(path, device_root))
            .collect::<Result<Vec<_>>>()?;

        Ok(BackupJob {
            destination: resolve_output(&config.output, now)?,
            sources,
            device_root: device_root.to_string(),
            delete_after,
        })
    }
}

/// Express `path` relative to `root`. Absolute paths must lie beneath the root,
/// since the archive, the check and the cleanup all join names onto it.
fn relative_to_root(path: &str, root: &str) -> Result<String> {
    if !path.starts_with('/') {
        return Ok(path.to_string());
    }

    let root = root.trim_end_matches('/');
    match path.strip_prefix(root).and_then(|rest| rest.strip_prefix('/')) {
        Some(rest) if !rest.trim_matches('/').is_empty() => {
            Ok(rest.trim_end_matches('/').to_string())
        }
        _ => Err(BackupError::ConfigInvalid(format!(
            "Path '{}' is not inside the device root '{}'",
            path, root
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_job_from_config() {
        let config = Config {
            output: "/backups/$date$/$time$/backup.tar".to_string(),
            paths: vec!["DCIM".to_string(), "Download".to_string()],
            device_root: None,
        };
        let now = NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap();

        let job = BackupJob::from_config(&config, now, true, "/sdcard").unwrap();

        assert_eq!(
            job.destination,
            PathBuf::from("/backups/2024-03-05/14-30/backup.tar")
        );
        assert_eq!(job.sources, vec!["DCIM", "Download"]);
        assert_eq!(job.device_root, "/sdcard");
        assert!(job.delete_after);
    }

    #[test]
    fn test_absolute_paths_are_made_relative_to_root() {
        assert_eq!(relative_to_root("/sdcard/DCIM", "/sdcard").unwrap(), "DCIM");
        assert_eq!(relative_to_root("/sdcard/DCIM/", "/sdcard/").unwrap(), "DCIM");
        assert_eq!(relative_to_root("Music", "/sdcard").unwrap(), "Music");
        assert_eq!(relative_to_root("/data/x", "/").unwrap(), "data/x");
    }

    #[test]
    fn test_absolute_path_outside_root_is_rejected() {
        for path in ["/data/app", "/sdcard", "/sdcardX/DCIM"] {
            match relative_to_root(path, "/sdcard") {
                Err(BackupError::ConfigInvalid(msg)) => assert!(msg.contains(path)),
                other => panic!("Expected ConfigInvalid for {}, got {:?}", path, other),
            }
        }
    }
}
