use std::time::{Duration, Instant};

/// Running byte count for one copy. Only ever moves forward.
#[derive(Debug, Clone)]
pub struct TransferProgress {
    transferred: u64,
    estimated_total: u64,
    started: Instant,
}

impl TransferProgress {
    pub fn new(estimated_total: u64) -> Self {
        TransferProgress {
            transferred: 0,
            estimated_total,
            started: Instant::now(),
        }
    }

    pub fn advance(&mut self, bytes: u64) {
        self.transferred = self.transferred.saturating_add(bytes);
    }

    pub fn transferred(&self) -> u64 {
        self.transferred
    }

    pub fn estimated_total(&self) -> u64 {
        self.estimated_total
    }

    /// The estimate comes from `du`, so the real stream can be larger.
    pub fn exceeds_estimate(&self) -> bool {
        self.transferred > self.estimated_total
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferStatus {
    Succeeded,
    Failed { code: Option<i32>, stderr: String },
}

#[derive(Debug, Clone)]
pub struct TransferOutcome {
    pub bytes: u64,
    pub elapsed: Duration,
    pub status: TransferStatus,
}

impl TransferOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self.status, TransferStatus::Succeeded)
    }
}
