use crate::device::parse::{self, shell_quote};
use crate::device::{CommandOutput, Device};
use crate::models::error::{BackupError, Result};
use log::{debug, trace};
use std::process::{Child, Command, Stdio};

/// Device reached through the `adb` command line tool.
#[derive(Debug, Clone)]
pub struct Adb {
    program: String,
    serial: Option<String>,
}

impl Adb {
    pub fn new(program: impl Into<String>, serial: Option<String>) -> Self {
        Adb {
            program: program.into(),
            serial,
        }
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        if let Some(serial) = &self.serial {
            command.arg("-s").arg(serial);
        }
        command
    }

    fn run(&self, args: &[&str]) -> Result<CommandOutput> {
        trace!("Running {} {:?}", self.program, args);
        let output = self
            .command()
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|cause| self.spawn_error(cause))?;
        let output = CommandOutput::from(output);
        trace!("{} exited with {:?}", self.program, output.code);
        Ok(output)
    }

    fn spawn(&self, args: &[&str], stdin: Stdio, stdout: Stdio) -> Result<Child> {
        debug!("Spawning {} {:?}", self.program, args);
        self.command()
            .args(args)
            .stdin(stdin)
            .stdout(stdout)
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|cause| self.spawn_error(cause))
    }

    fn spawn_error(&self, cause: std::io::Error) -> BackupError {
        BackupError::Spawn {
            program: self.program.clone(),
            cause,
        }
    }
}

fn quoted_paths(paths: &[String]) -> String {
    paths
        .iter()
        .map(|path| shell_quote(path))
        .collect::<Vec<_>>()
        .join(" ")
}

impl Device for Adb {
    fn state(&self) -> Result<CommandOutput> {
        self.run(&["get-state"])
    }

    fn devices(&self) -> Result<Vec<String>> {
        let output = self.run(&["devices"])?;
        Ok(parse::device_list(&output.stdout))
    }

    fn disk_usage(&self, root: &str, paths: &[String]) -> Result<CommandOutput> {
        let script = format!(
            "cd {} && du -csb {}",
            shell_quote(root),
            quoted_paths(paths)
        );
        self.run(&["shell", &script])
    }

    fn file_size(&self, path: &str) -> Result<Option<u64>> {
        let script = format!("stat -c '%s' {}", shell_quote(path));
        let output = self.run(&["shell", &script])?;
        if !output.success() {
            return Ok(None);
        }
        let size = parse::stat_size(&output.stdout);
        if size.is_none() {
            debug!("Unparsable stat output for {}: '{}'", path, output.stdout);
        }
        Ok(size)
    }

    fn remove(&self, path: &str) -> Result<CommandOutput> {
        let script = format!("rm -rf {}", shell_quote(path));
        self.run(&["shell", &script])
    }

    fn spawn_backup(&self, root: &str, paths: &[String]) -> Result<Child> {
        let script = format!(
            "cd {} && tar -cpf - {}",
            shell_quote(root),
            quoted_paths(paths)
        );
        self.spawn(&["exec-out", &script], Stdio::null(), Stdio::piped())
    }

    fn spawn_restore(&self, root: &str) -> Result<Child> {
        let script = format!("tar -xpf - -C {}", shell_quote(root));
        self.spawn(&["exec-in", &script], Stdio::piped(), Stdio::null())
    }
}
