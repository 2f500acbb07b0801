//! Spool - Sinks
//!
//! Rotation-aware, single-writer log file sink. Any number of producers may
//! write concurrently; events reach the file one at a time, in the order
//! they were accepted, and the file rotates into a bounded backup chain once
//! it reaches a size threshold.
//!
//! # Architecture
//!
//! ```text
//! [Logger] --LogEvent--> [FileSink::write] --> [WriteQueue] --> [worker]
//!                                                                  |
//!                                 [FileHandleManager] <------------+
//!                                 [RotationPolicy]    <------------+
//! ```
//!
//! | Component | Role |
//! |-----------|------|
//! | `rotation` | Pure rotation decision and backup shift planning |
//! | `file_handle` | Persistent or per-write file handle lifecycle |
//! | `queue` | FIFO serialization and completion handles |
//! | `file_sink` | Composition root: `write`, `shutdown` |
//! | `logger` | Level gate, line formatting, console mirror |
//!
//! I/O failures never reach producers. They are handed to a
//! [`Diagnostics`](util::Diagnostics) implementation, by default
//! rate-limited `tracing` errors.
//!
//! # Example
//!
//! ```ignore
//! use spool_sinks::{FileSink, FileSinkConfig};
//!
//! let sink = FileSink::new(FileSinkConfig::default().with_path("logs/app.log"));
//! sink.write("hello").await;
//! sink.shutdown().await;
//! ```

// =============================================================================
// Core components
// =============================================================================

/// Size-based rotation policy and backup chain planning
pub mod rotation;

/// Log file handle ownership (persistent or per-write)
pub mod file_handle;

/// Serialized FIFO write queue
pub mod queue;

/// The file sink itself
pub mod file_sink;

/// Level-gated logger facade with pluggable formatting and mirroring
pub mod logger;

// =============================================================================
// Shared types and utilities
// =============================================================================

/// Clock, diagnostics and rate-limited error reporting
pub mod util;

mod common;
mod event;

// =============================================================================
// Public re-exports
// =============================================================================

pub use common::{MetricsSnapshot, SinkError, SinkMetrics};
pub use event::LogEvent;
pub use file_handle::{FileHandleManager, HandleMode};
pub use file_sink::{
    DEFAULT_BACKUP_COUNT, DEFAULT_MAX_FILE_SIZE, FileSink, FileSinkBuilder, FileSinkConfig,
};
pub use logger::{ConsoleMirror, LevelPrefixFormatter, Level, LineFormatter, Logger, Mirror};
pub use queue::{WriteCompletion, WriteOutcome, WriteQueue};
pub use rotation::{RotationPolicy, RotationStep};
pub use util::{Clock, Diagnostics, SystemClock, TracingDiagnostics};
