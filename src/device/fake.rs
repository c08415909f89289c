//! Scriptable `Device` for service tests. Streaming calls run real `sh` children.

use crate::device::{CommandOutput, Device};
use crate::models::error::{BackupError, Result};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::process::{Child, Command, Stdio};

pub struct FakeDevice {
    pub connected: bool,
    pub du: CommandOutput,
    pub sizes: HashMap<String, u64>,
    pub backup_script: String,
    pub restore_script: String,
    pub undeletable: HashSet<String>,
    /// Paths whose removal fails to even start the bridge
    pub unreachable: HashSet<String>,
    pub calls: RefCell<Vec<String>>,
}

impl Default for FakeDevice {
    fn default() -> Self {
        FakeDevice {
            connected: true,
            du: ok("0\ttotal"),
            sizes: HashMap::new(),
            backup_script: "true".to_string(),
            restore_script: "cat > /dev/null".to_string(),
            undeletable: HashSet::new(),
            unreachable: HashSet::new(),
            calls: RefCell::new(Vec::new()),
        }
    }
}

pub fn ok(stdout: &str) -> CommandOutput {
    CommandOutput {
        stdout: stdout.to_string(),
        stderr: String::new(),
        code: Some(0),
    }
}

pub fn failed(stderr: &str) -> CommandOutput {
    CommandOutput {
        stdout: String::new(),
        stderr: stderr.to_string(),
        code: Some(1),
    }
}

impl FakeDevice {
    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn calls_starting_with(&self, prefix: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|call| call.starts_with(prefix))
            .collect()
    }

    fn sh(script: &str, stdin: Stdio, stdout: Stdio) -> Result<Child> {
        Ok(Command::new("sh")
            .arg("-c")
            .arg(script)
            .stdin(stdin)
            .stdout(stdout)
            .stderr(Stdio::piped())
            .spawn()?)
    }
}

impl Device for FakeDevice {
    fn state(&self) -> Result<CommandOutput> {
        self.record("state".to_string());
        Ok(if self.connected {
            ok("device")
        } else {
            failed("error: no devices/emulators found")
        })
    }

    fn devices(&self) -> Result<Vec<String>> {
        self.record("devices".to_string());
        Ok(vec!["FAKE0001\tdevice".to_string()])
    }

    fn disk_usage(&self, root: &str, paths: &[String]) -> Result<CommandOutput> {
        self.record(format!("du {} {}", root, paths.join(",")));
        Ok(self.du.clone())
    }

    fn file_size(&self, path: &str) -> Result<Option<u64>> {
        self.record(format!("stat {}", path));
        Ok(self.sizes.get(path).copied())
    }

    fn remove(&self, path: &str) -> Result<CommandOutput> {
        self.record(format!("rm {}", path));
        if self.unreachable.contains(path) {
            return Err(BackupError::Spawn {
                program: "adb".to_string(),
                cause: std::io::Error::new(std::io::ErrorKind::NotFound, "adb not found"),
            });
        }
        Ok(if self.undeletable.contains(path) {
            failed("rm: Read-only file system")
        } else {
            ok("")
        })
    }

    fn spawn_backup(&self, root: &str, paths: &[String]) -> Result<Child> {
        self.record(format!("backup {} {}", root, paths.join(",")));
        Self::sh(&self.backup_script, Stdio::null(), Stdio::piped())
    }

    fn spawn_restore(&self, root: &str) -> Result<Child> {
        self.record(format!("restore {}", root));
        Self::sh(&self.restore_script, Stdio::piped(), Stdio::null())
    }
}
