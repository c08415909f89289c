use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackupError {
    #[error("No Android device connected or device not authorized (adb state: '{state}')")]
    NoDevice { state: String },

    #[error("Error estimating size: {stderr}\nOne or more paths do not exist. Please check your config file.")]
    MissingPaths { stderr: String },

    #[error("Config file '{path}' does not exist")]
    ConfigNotFound { path: PathBuf },

    #[error("Failed to read config file '{path}': {cause}")]
    ConfigRead { path: PathBuf, cause: io::Error },

    #[error("Failed to parse config file '{path}': {cause}")]
    ConfigParse {
        path: PathBuf,
        cause: serde_json::Error,
    },

    #[error("Missing required key '{field}' in config file '{path}'")]
    ConfigMissingField { path: PathBuf, field: &'static str },

    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),

    #[error("File '{path}' does not exist")]
    FileNotFound { path: PathBuf },

    #[error("Unable to write to '{path}': {cause}")]
    SinkWrite { path: PathBuf, cause: io::Error },

    #[error("Device stopped accepting the archive stream: {cause}")]
    StreamWrite { cause: io::Error },

    #[error("Failed to start '{program}': {cause}")]
    Spawn { program: String, cause: io::Error },

    #[error("Unexpected {what} output from device: '{output}'")]
    UnexpectedOutput { what: &'static str, output: String },

    #[error("Failed to read archive '{path}': {cause}")]
    ArchiveRead { path: PathBuf, cause: io::Error },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, BackupError>;
