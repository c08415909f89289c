pub mod archive_entry;
pub mod backup_job;
pub mod check_report;
pub mod config;
pub mod error;
pub mod transfer;
