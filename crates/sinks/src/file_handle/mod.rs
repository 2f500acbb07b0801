//! Ownership of the log file handle
//!
//! [`FileHandleManager`] hides the two handle modes behind one contract:
//!
//! - [`HandleMode::Persistent`]: open once in append mode and reuse the
//!   handle. Before each write the handle is checked against the path on
//!   disk; if the file was deleted or replaced (external logrotate, manual
//!   cleanup) or a previous write faulted, the handle is reopened.
//! - [`HandleMode::PerWrite`]: every append opens, writes, flushes and
//!   closes. Nothing stays open between calls.
//!
//! Each line is written as `<timestamp> <line>\n`, with the timestamp taken
//! from the injected [`Clock`] just before that line is written.

use std::fs::{self, File, Metadata, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::common::SinkError;
use crate::util::Clock;

/// Buffer in front of the file; flushed at the end of every event
const WRITE_BUFFER_SIZE: usize = 64 * 1024;

/// How the log file is held between writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HandleMode {
    /// Keep the file open across writes
    #[default]
    Persistent,
    /// Open, write, flush and close on every append
    PerWrite,
}

impl HandleMode {
    pub fn from_persistent(persistent: bool) -> Self {
        if persistent {
            Self::Persistent
        } else {
            Self::PerWrite
        }
    }
}

/// Totals for one `append_lines` call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppendStats {
    pub lines: u64,
    pub bytes: u64,
}

/// (device, inode) of an open file, where the platform exposes them
type FileIdentity = Option<(u64, u64)>;

#[cfg(unix)]
fn file_identity(meta: &Metadata) -> FileIdentity {
    use std::os::unix::fs::MetadataExt;
    Some((meta.dev(), meta.ino()))
}

#[cfg(not(unix))]
fn file_identity(_meta: &Metadata) -> FileIdentity {
    None
}

struct OpenFile {
    writer: BufWriter<File>,
    identity: FileIdentity,
}

/// Owner of the log file handle
pub struct FileHandleManager {
    path: PathBuf,
    mode: HandleMode,
    clock: Arc<dyn Clock>,
    handle: Option<OpenFile>,
    line_buf: String,
}

impl FileHandleManager {
    pub fn new(path: impl Into<PathBuf>, mode: HandleMode, clock: Arc<dyn Clock>) -> Self {
        Self {
            path: path.into(),
            mode,
            clock,
            handle: None,
            line_buf: String::with_capacity(256),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mode(&self) -> HandleMode {
        self.mode
    }

    /// Whether a persistent handle is currently held
    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    /// Make sure a usable handle is held (persistent mode only)
    ///
    /// Reopens when the held handle no longer refers to the file at `path`.
    pub fn ensure_open(&mut self) -> Result<(), SinkError> {
        if self.mode == HandleMode::PerWrite {
            return Ok(());
        }

        if let Some(open) = &self.handle {
            if !self.is_stale(open) {
                return Ok(());
            }
            tracing::debug!(path = %self.path.display(), "log file changed on disk, reopening");
            self.handle = None;
        }

        self.handle = Some(self.open()?);
        Ok(())
    }

    /// Append every line of an event, timestamping each one as it is written
    ///
    /// Runs [`ensure_open`](Self::ensure_open) first, so callers never need to.
    /// In persistent mode the lines stay buffered until [`flush`](Self::flush).
    /// A failure drops the persistent handle so the next call reopens it.
    pub fn append_lines<S: AsRef<str>>(&mut self, lines: &[S]) -> Result<AppendStats, SinkError> {
        match self.mode {
            HandleMode::Persistent => {
                self.ensure_open()?;
                let Some(open) = self.handle.as_mut() else {
                    return Ok(AppendStats::default());
                };
                let result = write_lines(
                    &mut open.writer,
                    lines,
                    self.clock.as_ref(),
                    &mut self.line_buf,
                );
                if result.is_err() {
                    self.handle = None;
                }
                result.map_err(|e| SinkError::write(&self.path, e))
            }
            HandleMode::PerWrite => {
                let mut open = self.open()?;
                let stats = write_lines(
                    &mut open.writer,
                    lines,
                    self.clock.as_ref(),
                    &mut self.line_buf,
                )
                .map_err(|e| SinkError::write(&self.path, e))?;
                open.writer
                    .flush()
                    .map_err(|e| SinkError::flush(&self.path, e))?;
                Ok(stats)
            }
        }
    }

    /// Push buffered lines to the OS
    pub fn flush(&mut self) -> Result<(), SinkError> {
        let Some(open) = self.handle.as_mut() else {
            return Ok(());
        };
        if let Err(e) = open.writer.flush() {
            self.handle = None;
            return Err(SinkError::flush(&self.path, e));
        }
        Ok(())
    }

    /// Flush and release the persistent handle; no-op when none is held
    pub fn close(&mut self) -> Result<(), SinkError> {
        let Some(mut open) = self.handle.take() else {
            return Ok(());
        };
        open.writer
            .flush()
            .map_err(|e| SinkError::close(&self.path, e))?;
        tracing::debug!(path = %self.path.display(), "log file closed");
        Ok(())
    }

    /// Size of the live file as the filesystem reports it
    ///
    /// A missing file counts as empty.
    pub fn current_size(&self) -> Result<u64, SinkError> {
        match fs::metadata(&self.path) {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(0),
            Err(e) => Err(SinkError::stat(&self.path, e)),
        }
    }

    fn open(&self) -> Result<OpenFile, SinkError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| SinkError::create_dir(parent, e))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| SinkError::open(&self.path, e))?;

        let identity = file
            .metadata()
            .map(|m| file_identity(&m))
            .map_err(|e| SinkError::stat(&self.path, e))?;

        if self.mode == HandleMode::Persistent {
            tracing::debug!(path = %self.path.display(), "log file opened");
        }

        Ok(OpenFile {
            writer: BufWriter::with_capacity(WRITE_BUFFER_SIZE, file),
            identity,
        })
    }

    /// The held handle is stale when the path is gone or points elsewhere
    fn is_stale(&self, open: &OpenFile) -> bool {
        match fs::metadata(&self.path) {
            Ok(meta) => match (open.identity, file_identity(&meta)) {
                (Some(held), Some(on_disk)) => held != on_disk,
                _ => false,
            },
            Err(_) => true,
        }
    }
}

impl Drop for FileHandleManager {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::warn!(error = %e, "failed to close log file on drop");
        }
    }
}

fn write_lines<W: Write, S: AsRef<str>>(
    writer: &mut W,
    lines: &[S],
    clock: &dyn Clock,
    buf: &mut String,
) -> io::Result<AppendStats> {
    let mut stats = AppendStats::default();
    for line in lines {
        buf.clear();
        buf.push_str(&clock.timestamp());
        buf.push(' ');
        buf.push_str(line.as_ref());
        buf.push('\n');
        writer.write_all(buf.as_bytes())?;
        stats.lines += 1;
        stats.bytes += buf.len() as u64;
    }
    Ok(stats)
}

#[cfg(test)]
#[path = "file_handle_test.rs"]
mod file_handle_test;
