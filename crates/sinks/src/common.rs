//! Common types for the file sink
//!
//! Errors and counters shared by the handle manager, the write queue and
//! the sink itself.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;

/// Failures raised inside the sink
///
/// These never reach a producer. The write queue hands them to the
/// diagnostic channel and moves on to the next event.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Log file could not be opened or created
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Parent directory could not be created
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Appending a line failed
    #[error("write to {path} failed: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Flushing buffered lines failed
    #[error("flush of {path} failed: {source}")]
    Flush {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Releasing the handle failed
    #[error("close of {path} failed: {source}")]
    Close {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// One step of a backup shift failed
    #[error("rotation step {step} failed: {source}")]
    Rotate {
        step: String,
        #[source]
        source: io::Error,
    },

    /// Reading file metadata failed
    #[error("stat of {path} failed: {source}")]
    Stat {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl SinkError {
    pub(crate) fn open(path: &Path, source: io::Error) -> Self {
        Self::Open {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn create_dir(path: &Path, source: io::Error) -> Self {
        Self::CreateDir {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn write(path: &Path, source: io::Error) -> Self {
        Self::Write {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn flush(path: &Path, source: io::Error) -> Self {
        Self::Flush {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn close(path: &Path, source: io::Error) -> Self {
        Self::Close {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn rotate(step: impl Into<String>, source: io::Error) -> Self {
        Self::Rotate {
            step: step.into(),
            source,
        }
    }

    pub(crate) fn stat(path: &Path, source: io::Error) -> Self {
        Self::Stat {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Short label used as the diagnostic message
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Open { .. } => "open",
            Self::CreateDir { .. } => "create_dir",
            Self::Write { .. } => "write",
            Self::Flush { .. } => "flush",
            Self::Close { .. } => "close",
            Self::Rotate { .. } => "rotate",
            Self::Stat { .. } => "stat",
        }
    }
}

/// Counters for a file sink
#[derive(Debug, Default)]
pub struct SinkMetrics {
    /// Events accepted by `write`
    pub events_received: AtomicU64,

    /// Events fully written and flushed
    pub events_written: AtomicU64,

    /// Lines written
    pub lines_written: AtomicU64,

    /// Bytes written, timestamps included
    pub bytes_written: AtomicU64,

    /// Open, write or flush failures
    pub write_errors: AtomicU64,

    /// Completed rotations
    pub rotations: AtomicU64,

    /// Rotations that stopped partway
    pub rotation_errors: AtomicU64,

    /// Events refused because the sink was shut down
    pub rejected: AtomicU64,
}

impl SinkMetrics {
    pub const fn new() -> Self {
        Self {
            events_received: AtomicU64::new(0),
            events_written: AtomicU64::new(0),
            lines_written: AtomicU64::new(0),
            bytes_written: AtomicU64::new(0),
            write_errors: AtomicU64::new(0),
            rotations: AtomicU64::new(0),
            rotation_errors: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn record_received(&self) {
        self.events_received.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_written(&self, lines: u64, bytes: u64) {
        self.events_written.fetch_add(1, Ordering::Relaxed);
        self.lines_written.fetch_add(lines, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_write_error(&self) {
        self.write_errors.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_rotation(&self) {
        self.rotations.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_rotation_error(&self) {
        self.rotation_errors.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            events_received: self.events_received.load(Ordering::Relaxed),
            events_written: self.events_written.load(Ordering::Relaxed),
            lines_written: self.lines_written.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            write_errors: self.write_errors.load(Ordering::Relaxed),
            rotations: self.rotations.load(Ordering::Relaxed),
            rotation_errors: self.rotation_errors.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of sink metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub events_received: u64,
    pub events_written: u64,
    pub lines_written: u64,
    pub bytes_written: u64,
    pub write_errors: u64,
    pub rotations: u64,
    pub rotation_errors: u64,
    pub rejected: u64,
}

#[cfg(test)]
#[path = "common_test.rs"]
mod common_test;
