use crate::models::error::{BackupError, Result};
use chrono::NaiveDateTime;
use log::{debug, info};
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

const DATE_PLACEHOLDER: &str = "$date$";
const TIME_PLACEHOLDER: &str = "$time$";
const REQUIRED_KEYS: [&str; 2] = ["output", "paths"];

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Destination archive path, may contain `$date$` and `$time$`
    pub output: String,
    /// Device paths, relative to the device root or absolute beneath it
    pub paths: Vec<String>,
    #[serde(default)]
    pub device_root: Option<String>,
}

impl Config {
    /// Device directory the paths are relative to, `fallback` when unset.
    pub fn device_root<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.device_root.as_deref().unwrap_or(fallback)
    }
}

pub fn setup_config(config_file: impl AsRef<Path>) -> Result<Config> {
    let config_path = config_file.as_ref().to_path_buf();
    info!("Loading config from: {}", config_path.display());

    let config_str = fs::read_to_string(&config_path).map_err(|cause| {
        if cause.kind() == io::ErrorKind::NotFound {
            BackupError::ConfigNotFound {
                path: config_path.clone(),
            }
        } else {
            BackupError::ConfigRead {
                path: config_path.clone(),
                cause,
            }
        }
    })?;

    let value: serde_json::Value =
        serde_json::from_str(&config_str).map_err(|cause| BackupError::ConfigParse {
            path: config_path.clone(),
            cause,
        })?;

    // Missing keys get their own error instead of serde's "missing field"
    if let Some(object) = value.as_object() {
        for field in REQUIRED_KEYS {
            if !object.contains_key(field) {
                return Err(BackupError::ConfigMissingField {
                    path: config_path,
                    field,
                });
            }
        }
    }

    let config: Config =
        serde_json::from_value(value).map_err(|cause| BackupError::ConfigParse {
            path: config_path,
            cause,
        })?;

    validate_config(&config)?;
    debug!("Loaded config: {:?}", &config);

    Ok(config)
}

fn validate_config(config: &Config) -> Result<()> {
    if config.output.trim().is_empty() {
        return Err(BackupError::ConfigInvalid(
            "'output' must not be empty".to_string(),
        ));
    }

    if config.paths.is_empty() {
        return Err(BackupError::ConfigInvalid(
            "'paths' must list at least one device path".to_string(),
        ));
    }

    for (idx, path) in config.paths.iter().enumerate() {
        if path.trim().is_empty() {
            return Err(BackupError::ConfigInvalid(format!(
                "Path #{} is empty",
                idx + 1
            )));
        }
        if Path::new(path)
            .components()
            .any(|c| matches!(c, Component::ParentDir))
        {
            return Err(BackupError::ConfigInvalid(format!(
                "Path #{} must not contain '..': {}",
                idx + 1,
                path
            )));
        }
    }

    if let Some(root) = &config.device_root {
        if !root.starts_with('/') {
            return Err(BackupError::ConfigInvalid(format!(
                "'device_root' must be an absolute device path: {}",
                root
            )));
        }
    }

    Ok(())
}

/// Substitute `$date$`/`$time$` and make the result absolute.
pub fn resolve_output(template: &str, now: NaiveDateTime) -> Result<PathBuf> {
    let resolved = template
        .replace(DATE_PLACEHOLDER, &now.format("%Y-%m-%d").to_string())
        .replace(TIME_PLACEHOLDER, &now.format("%H-%M").to_string());

    Ok(std::path::absolute(resolved)?)
}
