use crate::device::ChildGuard;
use crate::models::error::{BackupError, Result};
use crate::models::transfer::{TransferOutcome, TransferProgress, TransferStatus};
use indicatif::ProgressBar;
use log::{debug, warn};
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;
use std::process::{Child, ChildStderr, ExitStatus};
use std::thread::{self, JoinHandle};
use thiserror::Error;

pub const CHUNK_SIZE: usize = 32 * 1024 * 1024;

#[derive(Error, Debug)]
pub enum StreamError {
    #[error("reading source failed: {0}")]
    Read(io::Error),

    #[error("writing sink failed: {0}")]
    Write(io::Error),
}

/// Relay every byte of `source` into `sink`, one chunk at a time.
///
/// A chunk is written completely before progress moves and the next read
/// starts. The loop ends on end-of-data only; the progress estimate never
/// decides completion.
pub fn copy_chunked<R: Read, W: Write>(
    source: &mut R,
    sink: &mut W,
    chunk_size: usize,
    progress: &mut TransferProgress,
    bar: Option<&ProgressBar>,
) -> std::result::Result<u64, StreamError> {
    let mut buffer = vec![0u8; chunk_size.max(1)];
    let mut copied = 0u64;

    loop {
        let filled = fill_chunk(source, &mut buffer).map_err(StreamError::Read)?;
        if filled == 0 {
            break;
        }

        sink.write_all(&buffer[..filled])
            .map_err(StreamError::Write)?;

        copied += filled as u64;
        progress.advance(filled as u64);
        if let Some(pb) = bar {
            if progress.exceeds_estimate() {
                pb.set_length(progress.transferred());
            }
            pb.set_position(progress.transferred());
        }
    }

    sink.flush().map_err(StreamError::Write)?;
    Ok(copied)
}

/// Read until `buffer` is full or the source is exhausted.
fn fill_chunk<R: Read>(source: &mut R, buffer: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buffer.len() {
        match source.read(&mut buffer[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Collect stderr on a side thread so a chatty child never blocks on a full pipe.
fn drain_stderr(stderr: Option<ChildStderr>) -> Option<JoinHandle<String>> {
    stderr.map(|mut stderr| {
        thread::spawn(move || {
            let mut buf = String::new();
            let _ = stderr.read_to_string(&mut buf);
            buf
        })
    })
}

fn join_stderr(handle: Option<JoinHandle<String>>) -> String {
    match handle {
        Some(handle) => handle.join().unwrap_or_default().trim().to_string(),
        None => String::new(),
    }
}

fn outcome(status: ExitStatus, stderr: String, progress: &TransferProgress) -> TransferOutcome {
    let status = if status.success() {
        TransferStatus::Succeeded
    } else {
        TransferStatus::Failed {
            code: status.code(),
            stderr,
        }
    };
    TransferOutcome {
        bytes: progress.transferred(),
        elapsed: progress.elapsed(),
        status,
    }
}

/// Backup direction: drain the child's stdout into `sink`.
///
/// A failed sink write kills the child and returns `SinkWrite`, leaving
/// whatever was written in place. Otherwise the child's exit status decides
/// the outcome, whatever the byte count.
pub fn stream_from_child<W: Write>(
    child: Child,
    sink: &mut W,
    sink_path: &Path,
    estimated_total: u64,
    bar: Option<&ProgressBar>,
) -> Result<TransferOutcome> {
    let mut guard = ChildGuard::new(child);
    let stderr = drain_stderr(guard.take_stderr());
    let mut stdout = guard.take_stdout().ok_or_else(|| {
        BackupError::Io(io::Error::new(
            io::ErrorKind::BrokenPipe,
            "archive process has no stdout",
        ))
    })?;

    let mut progress = TransferProgress::new(estimated_total);
    let copy_result = copy_chunked(&mut stdout, sink, CHUNK_SIZE, &mut progress, bar);
    drop(stdout);

    match copy_result {
        Ok(bytes) => {
            let status = guard.wait()?;
            let stderr = join_stderr(stderr);
            debug!(
                "Archive process exited with {} after {} bytes (estimated {})",
                status,
                bytes,
                progress.estimated_total()
            );
            Ok(outcome(status, stderr, &progress))
        }
        Err(StreamError::Write(cause)) => {
            warn!(
                "Write to {} failed after {} bytes, stopping archive process",
                sink_path.display(),
                progress.transferred()
            );
            let _ = guard.abort();
            let _ = join_stderr(stderr);
            Err(BackupError::SinkWrite {
                path: sink_path.to_path_buf(),
                cause,
            })
        }
        Err(StreamError::Read(cause)) => {
            let _ = guard.abort();
            let _ = join_stderr(stderr);
            Err(BackupError::Io(cause))
        }
    }
}

/// Restore direction: feed `source` into the child's stdin, then close it.
///
/// Writes block while the child is busy, which is all the flow control
/// there is. A child that stops reading and exits nonzero yields a failed
/// outcome with its stderr.
pub fn stream_into_child(
    source: &mut File,
    child: Child,
    total: u64,
    bar: Option<&ProgressBar>,
) -> Result<TransferOutcome> {
    let mut guard = ChildGuard::new(child);
    let stderr = drain_stderr(guard.take_stderr());
    let mut stdin = guard.take_stdin().ok_or_else(|| {
        BackupError::Io(io::Error::new(
            io::ErrorKind::BrokenPipe,
            "extract process has no stdin",
        ))
    })?;

    let mut progress = TransferProgress::new(total);
    let copy_result = copy_chunked(source, &mut stdin, CHUNK_SIZE, &mut progress, bar);
    // Closing stdin is the end-of-archive signal for the extractor
    drop(stdin);

    match copy_result {
        Ok(bytes) => {
            let status = guard.wait()?;
            debug!("Extract process exited with {} after {} bytes", status, bytes);
            Ok(outcome(status, join_stderr(stderr), &progress))
        }
        Err(StreamError::Write(cause)) => {
            let status = guard.wait()?;
            let stderr = join_stderr(stderr);
            if status.success() {
                Err(BackupError::StreamWrite { cause })
            } else {
                Ok(outcome(status, stderr, &progress))
            }
        }
        Err(StreamError::Read(cause)) => {
            let _ = guard.abort();
            let _ = join_stderr(stderr);
            Err(BackupError::Io(cause))
        }
    }
}
