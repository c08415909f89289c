use crate::models::archive_entry::ArchiveEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Fail,
}

impl CheckStatus {
    pub fn label(&self) -> &'static str {
        match self {
            CheckStatus::Pass => "PASS",
            CheckStatus::Fail => "FAIL",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CheckedEntry {
    pub entry: ArchiveEntry,
    pub device_size: Option<u64>,
    pub status: CheckStatus,
}

#[derive(Debug, Clone, Default)]
pub struct CheckReport {
    pub entries: Vec<CheckedEntry>,
    pub passed: usize,
    pub failed: usize,
    pub total: usize,
}

impl CheckReport {
    pub fn record(&mut self, checked: CheckedEntry) {
        self.total += 1;
        match checked.status {
            CheckStatus::Pass => self.passed += 1,
            CheckStatus::Fail => self.failed += 1,
        }
        self.entries.push(checked);
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}
