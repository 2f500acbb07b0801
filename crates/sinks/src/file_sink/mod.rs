//! File Sink - rotation-aware append-only log file
//!
//! Composes the handle manager, the rotation policy and the write queue
//! into the producer-facing contract: [`FileSink::write`] and
//! [`FileSink::shutdown`].
//!
//! # Output Format
//!
//! ```text
//! 2025-01-15T10:30:45.123Z server listening on 0.0.0.0:8080
//! 2025-01-15T10:30:45.124Z accepted connection from 10.0.0.7
//! ```
//!
//! # Directory Structure
//!
//! ```text
//! logs/
//! ├── app.log      # live file
//! ├── app.log.1    # most recent rotation
//! └── app.log.2    # oldest kept (backup_count = 2)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use spool_sinks::{FileSink, FileSinkConfig, LogEvent};
//!
//! let sink = FileSink::new(
//!     FileSinkConfig::default()
//!         .with_path("logs/app.log")
//!         .with_max_file_size(5 * 1024 * 1024)
//!         .with_backup_count(3),
//! );
//!
//! // Fire and forget
//! drop(sink.write("starting up"));
//!
//! // Or wait until the lines are on disk
//! sink.write(LogEvent::new(["panic:", "  at main.rs:10"])).await;
//!
//! sink.shutdown().await;
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::common::{MetricsSnapshot, SinkMetrics};
use crate::event::LogEvent;
use crate::file_handle::{FileHandleManager, HandleMode};
use crate::queue::{WriteCompletion, WriteQueue};
use crate::rotation::RotationPolicy;
use crate::util::{Clock, DEFAULT_LOG_INTERVAL, Diagnostics, SystemClock, TracingDiagnostics};

/// Default rotation threshold (5 MiB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;

/// Default number of rotated files kept
pub const DEFAULT_BACKUP_COUNT: usize = 3;

/// Configuration for a file sink; fixed for the sink's lifetime
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSinkConfig {
    /// Live log file; backups are written next to it
    pub path: PathBuf,

    /// Rotate once the live file reaches this many bytes (0 disables)
    pub max_file_size: u64,

    /// Rotated files to keep
    pub backup_count: usize,

    /// Keep the file open between writes instead of reopening per event
    pub persistent_handle: bool,

    /// Minimum spacing between emitted failure diagnostics
    pub diagnostic_interval: Duration,
}

impl Default for FileSinkConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("logs/app.log"),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            backup_count: DEFAULT_BACKUP_COUNT,
            persistent_handle: true,
            diagnostic_interval: DEFAULT_LOG_INTERVAL,
        }
    }
}

impl FileSinkConfig {
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    #[must_use]
    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    #[must_use]
    pub fn with_backup_count(mut self, count: usize) -> Self {
        self.backup_count = count;
        self
    }

    #[must_use]
    pub fn with_persistent_handle(mut self, persistent: bool) -> Self {
        self.persistent_handle = persistent;
        self
    }

    /// Open, write and close on every event
    #[must_use]
    pub fn per_write(self) -> Self {
        self.with_persistent_handle(false)
    }

    #[must_use]
    pub fn with_diagnostic_interval(mut self, interval: Duration) -> Self {
        self.diagnostic_interval = interval;
        self
    }

    pub fn rotation_policy(&self) -> RotationPolicy {
        RotationPolicy::new(self.max_file_size, self.backup_count)
    }

    pub fn handle_mode(&self) -> HandleMode {
        HandleMode::from_persistent(self.persistent_handle)
    }
}

/// Builder for swapping the clock or diagnostic channel
pub struct FileSinkBuilder {
    config: FileSinkConfig,
    clock: Arc<dyn Clock>,
    diagnostics: Option<Arc<dyn Diagnostics>>,
}

impl FileSinkBuilder {
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.diagnostics = Some(diagnostics);
        self
    }

    /// Start the sink. Must be called from within a tokio runtime.
    pub fn build(self) -> FileSink {
        let diagnostics: Arc<dyn Diagnostics> = match self.diagnostics {
            Some(diagnostics) => diagnostics,
            None => Arc::new(TracingDiagnostics::new(self.config.diagnostic_interval)),
        };
        let metrics = Arc::new(SinkMetrics::new());

        let files = FileHandleManager::new(
            self.config.path.clone(),
            self.config.handle_mode(),
            self.clock,
        );
        let queue = WriteQueue::start(
            files,
            self.config.rotation_policy(),
            diagnostics,
            Arc::clone(&metrics),
        );

        tracing::info!(
            path = %self.config.path.display(),
            max_file_size = self.config.max_file_size,
            backup_count = self.config.backup_count,
            persistent_handle = self.config.persistent_handle,
            "file sink starting"
        );

        FileSink {
            path: self.config.path,
            queue,
            metrics,
        }
    }
}

/// Rotation-aware log file sink
///
/// Share it by reference or `Arc`; `write` takes `&self` and may be called
/// from any number of tasks or threads.
///
/// The writer runs on the runtime's blocking pool until the sink is shut
/// down or dropped. Call [`shutdown`](Self::shutdown) (or drop every handle
/// to the sink) before the runtime goes away, otherwise runtime teardown
/// waits on a worker that is still parked on the queue.
pub struct FileSink {
    path: PathBuf,
    queue: WriteQueue,
    metrics: Arc<SinkMetrics>,
}

impl FileSink {
    /// Start a sink with the system clock and tracing diagnostics
    pub fn new(config: FileSinkConfig) -> Self {
        Self::builder(config).build()
    }

    pub fn builder(config: FileSinkConfig) -> FileSinkBuilder {
        FileSinkBuilder {
            config,
            clock: Arc::new(SystemClock),
            diagnostics: None,
        }
    }

    /// Queue an event; await the result to know its lines are on disk
    pub fn write(&self, event: impl Into<LogEvent>) -> WriteCompletion {
        self.queue.submit(event.into())
    }

    /// Stop accepting events, drain everything queued, close the file
    ///
    /// Call once during graceful termination. Repeated calls are no-ops.
    pub async fn shutdown(&self) {
        let was_open = !self.queue.is_closed();
        self.queue.shutdown().await;
        if !was_open {
            return;
        }

        let snapshot = self.metrics.snapshot();
        tracing::info!(
            path = %self.path.display(),
            events = snapshot.events_written,
            lines = snapshot.lines_written,
            bytes = snapshot.bytes_written,
            rotations = snapshot.rotations,
            errors = snapshot.write_errors + snapshot.rotation_errors,
            "file sink shut down"
        );
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}
