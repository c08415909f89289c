mod device;
mod models;
mod service;
mod utils;

use crate::device::adb::Adb;
use crate::device::DEFAULT_DEVICE_ROOT;
use crate::models::check_report::{CheckReport, CheckStatus, CheckedEntry};
use crate::models::transfer::{TransferOutcome, TransferStatus};
use crate::service::backup::run_backup;
use crate::service::check::check_archive;
use crate::service::restore::run_restore;
use crate::utils::progress::{create_progress_bar, format_elapsed, format_size, truncate_name};
use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{ArgGroup, CommandFactory, Parser};
use indicatif::ProgressBar;
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

const DEFAULT_TERM_COLS: usize = 80;
const MIN_NAME_WIDTH: usize = 12;
// "Test | Type | " before the name and " | " plus the size column after it
const FIXED_COLUMNS: usize = 29;

#[derive(Parser, Debug)]
#[command(name = "adb-tar")]
#[command(about = "Back up, restore and verify Android device paths as tar archives over adb", long_about = None)]
#[command(group(
    ArgGroup::new("operation")
        .required(true)
        .args(["backup", "restore", "check"])
))]
struct Cli {
    /// Backup paths listed in config file
    #[arg(short = 'b', long = "backup", value_name = "config.json")]
    backup: Option<PathBuf>,

    /// Restore from specified tar file
    #[arg(short = 'r', long = "restore", value_name = "backup.tar")]
    restore: Option<PathBuf>,

    /// Compare content of tar file with device
    #[arg(short = 'c', long = "check", value_name = "backup.tar")]
    check: Option<PathBuf>,

    /// Remove transferred files from device when using (-b)
    #[arg(short = 'd', long = "delete")]
    delete: bool,

    /// Print each file when using (-c)
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    #[arg(long = "adb", default_value = "adb", env = "ADB_TAR_ADB")]
    adb: String,

    #[arg(short = 's', long = "serial", env = "ANDROID_SERIAL")]
    serial: Option<String>,

    /// Device directory archives are relative to
    #[arg(
        long = "device-root",
        default_value = DEFAULT_DEVICE_ROOT,
        env = "ADB_TAR_DEVICE_ROOT"
    )]
    device_root: String,

    #[arg(
        short = 'l',
        long = "log-level",
        default_value = "info",
        env = "LOG_LEVEL"
    )]
    log_level: String,

    #[arg(short = 'q', long = "quiet")]
    quiet: bool,
}

/// Parse the command line, rejecting `-d` outside of a backup.
fn parse_args<I, T>(iter: I) -> std::result::Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let args = Cli::try_parse_from(iter)?;
    if args.delete && args.backup.is_none() {
        return Err(Cli::command().error(
            ErrorKind::ArgumentConflict,
            "-d/--delete can only be used together with -b/--backup",
        ));
    }
    Ok(args)
}

fn main() -> ExitCode {
    let args = parse_args(std::env::args_os()).unwrap_or_else(|e| e.exit());

    let log_level = match args.log_level.to_lowercase().as_str() {
        "trace" => log::LevelFilter::Trace,
        "debug" => log::LevelFilter::Debug,
        "info" => log::LevelFilter::Info,
        "warn" => log::LevelFilter::Warn,
        "error" => log::LevelFilter::Error,
        _ => log::LevelFilter::Info,
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .format_timestamp_secs()
        .init();

    debug!("Arguments: {:?}", args);

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Cli) -> Result<ExitCode> {
    let device = Adb::new(args.adb.clone(), args.serial.clone());
    let show_progress = !args.quiet;

    if let Some(config_file) = &args.backup {
        let now = chrono::Local::now().naive_local();
        let summary = run_backup(
            &device,
            config_file,
            args.delete,
            now,
            &args.device_root,
            show_progress,
        )
        .context("Backup aborted")?;

        info!(
            "Estimated {} for {} path(s)",
            format_size(summary.estimated_size),
            summary.job.sources.len()
        );
        if let Some(cleanup) = &summary.cleanup {
            info!("Removed {} path(s) from the device", cleanup.removed.len());
            if !cleanup.failed.is_empty() {
                warn!(
                    "{} of {} paths could not be removed from the device",
                    cleanup.failed.len(),
                    summary.job.sources.len()
                );
            }
        }
        return Ok(report_transfer("Backup transferred", &summary.outcome));
    }

    if let Some(archive) = &args.restore {
        let archive = absolute(archive);
        let outcome = run_restore(&device, &archive, &args.device_root, show_progress)
            .context("Restore aborted")?;
        return Ok(report_transfer("Backup restored", &outcome));
    }

    if let Some(archive) = &args.check {
        let archive = absolute(archive);
        info!("[Check] {}", archive.display());
        let report = run_check(&device, &archive, &args.device_root, args.verbose, show_progress)
            .context("Check aborted")?;
        println!(
            "\nPassed: {} | Failed: {} | Total: {}",
            report.passed, report.failed, report.total
        );
        if !report.all_passed() {
            warn!("{} item(s) differ between archive and device", report.failed);
        }
        return Ok(ExitCode::SUCCESS);
    }

    Ok(ExitCode::FAILURE)
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Exit code 2 marks a transfer whose process reported failure.
fn report_transfer(what: &str, outcome: &TransferOutcome) -> ExitCode {
    match &outcome.status {
        TransferStatus::Succeeded => {
            println!(
                "\n{} successfully ({}) in {}\n",
                what,
                format_size(outcome.bytes),
                format_elapsed(outcome.elapsed)
            );
            ExitCode::SUCCESS
        }
        TransferStatus::Failed { code, stderr } => {
            error!(
                "Transfer failed after {} (exit code {:?}). Error: {}",
                format_size(outcome.bytes),
                code,
                stderr
            );
            ExitCode::from(2)
        }
    }
}

fn run_check(
    device: &Adb,
    archive: &Path,
    root: &str,
    verbose: bool,
    show_progress: bool,
) -> Result<CheckReport> {
    let bar = show_progress.then(|| create_progress_bar(0, "Check"));
    let width = name_width(
        console::Term::stdout()
            .size_checked()
            .map(|(_, cols)| cols as usize),
    );

    if verbose {
        println!(
            "{:<4} | {:<4} | {:<width$} | {:<12}",
            "Test",
            "Type",
            "Name",
            "Size (bytes)",
            width = width
        );
        println!("{}", "-".repeat(width + FIXED_COLUMNS));
    }

    let started = std::time::Instant::now();
    let report = check_archive(device, archive, root, bar.as_ref(), |checked| {
        if verbose {
            print_row(bar.as_ref(), checked, width);
        }
    })?;

    if let Some(bar) = &bar {
        bar.finish();
    }
    info!("Integrity checked in {}", format_elapsed(started.elapsed()));
    Ok(report)
}

/// Name column width for a terminal `cols` wide, or a default one when unknown.
fn name_width(cols: Option<usize>) -> usize {
    cols.unwrap_or(DEFAULT_TERM_COLS)
        .saturating_sub(FIXED_COLUMNS)
        .max(MIN_NAME_WIDTH)
}

fn print_row(bar: Option<&ProgressBar>, checked: &CheckedEntry, width: usize) {
    let size = if checked.entry.is_dir {
        String::new()
    } else {
        checked.entry.size.to_string()
    };
    let mut line = format!(
        "{:<4} | {:<4} | {:<width$} | {:<12}",
        checked.status.label(),
        checked.entry.kind(),
        truncate_name(&checked.entry.name, width),
        size,
        width = width
    );
    if checked.status == CheckStatus::Fail {
        match checked.device_size {
            Some(device_size) => line.push_str(&format!(" (device: {})", device_size)),
            None => line.push_str(" (missing on device)"),
        }
    }
    match bar {
        Some(bar) => bar.println(line),
        None => println!("{}", line),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_operations_are_mutually_exclusive() {
        assert!(parse_args(["adb-tar", "-b", "c.json", "-r", "b.tar"]).is_err());
        assert!(parse_args(["adb-tar"]).is_err());
    }

    #[test]
    fn test_delete_requires_backup() {
        for argv in [
            ["adb-tar", "-r", "b.tar", "-d"],
            ["adb-tar", "-d", "-c", "b.tar"],
        ] {
            let err = parse_args(argv).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
        }

        let args = parse_args(["adb-tar", "-b", "c.json", "-d"]).unwrap();
        assert!(args.delete);
        assert_eq!(args.backup, Some(PathBuf::from("c.json")));
    }

    #[test]
    fn test_name_width_follows_terminal() {
        assert_eq!(name_width(Some(120)), 120 - FIXED_COLUMNS);
        assert_eq!(name_width(None), DEFAULT_TERM_COLS - FIXED_COLUMNS);
        assert_eq!(name_width(Some(20)), MIN_NAME_WIDTH);
    }

    #[test]
    fn test_check_verbose() {
        let args = parse_args(["adb-tar", "-c", "b.tar", "-v"]).unwrap();
        assert!(args.verbose);
        assert_eq!(args.check, Some(PathBuf::from("b.tar")));
    }
}
