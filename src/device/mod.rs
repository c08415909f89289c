pub mod adb;
#[cfg(test)]
pub mod fake;
pub mod parse;

use crate::models::error::Result;
use std::io;
use std::process::{Child, ChildStderr, ChildStdin, ChildStdout, ExitStatus, Output};

pub const DEFAULT_DEVICE_ROOT: &str = "/sdcard";

/// Captured result of a synchronous bridge command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub code: Option<i32>,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl From<Output> for CommandOutput {
    fn from(output: Output) -> Self {
        CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            code: output.status.code(),
        }
    }
}

/// Everything the operations need from an attached device.
///
/// `root` arguments are absolute device directories; `paths` are relative to them.
pub trait Device {
    /// Connection state query (`get-state`).
    fn state(&self) -> Result<CommandOutput>;

    /// Attached devices, one line each.
    fn devices(&self) -> Result<Vec<String>>;

    /// Combined disk usage query for `paths`.
    fn disk_usage(&self, root: &str, paths: &[String]) -> Result<CommandOutput>;

    /// Size of a single absolute device path, `None` if it cannot be stat'ed.
    fn file_size(&self, path: &str) -> Result<Option<u64>>;

    /// Recursively remove an absolute device path.
    fn remove(&self, path: &str) -> Result<CommandOutput>;

    /// Start a process streaming a tar of `paths` on its stdout.
    fn spawn_backup(&self, root: &str, paths: &[String]) -> Result<Child>;

    /// Start a process extracting a tar read from its stdin into `root`.
    fn spawn_restore(&self, root: &str) -> Result<Child>;
}

/// Owns a spawned child and makes sure it is reaped.
///
/// Dropping a guard that was never waited on kills the child and collects its
/// exit status.
pub struct ChildGuard {
    child: Child,
    reaped: bool,
}

impl ChildGuard {
    pub fn new(child: Child) -> Self {
        ChildGuard {
            child,
            reaped: false,
        }
    }

    pub fn take_stdout(&mut self) -> Option<ChildStdout> {
        self.child.stdout.take()
    }

    pub fn take_stdin(&mut self) -> Option<ChildStdin> {
        self.child.stdin.take()
    }

    pub fn take_stderr(&mut self) -> Option<ChildStderr> {
        self.child.stderr.take()
    }

    pub fn wait(mut self) -> io::Result<ExitStatus> {
        self.wait_inner()
    }

    /// Kill the child and collect its status.
    pub fn abort(mut self) -> io::Result<ExitStatus> {
        // kill fails if it already exited, wait still reaps it
        let _ = self.child.kill();
        self.wait_inner()
    }

    fn wait_inner(&mut self) -> io::Result<ExitStatus> {
        let status = self.child.wait()?;
        self.reaped = true;
        Ok(status)
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        if !self.reaped {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}
