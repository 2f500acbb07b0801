//! Size-based rotation with a bounded backup chain
//!
//! Deciding and planning are pure: [`RotationPolicy::should_rotate`] looks at
//! a size, [`RotationPolicy::plan`] turns a live path into an ordered list of
//! [`RotationStep`]s. Only [`execute_plan`] touches the filesystem.
//!
//! # Disk layout
//!
//! ```text
//! app.log      <- live file
//! app.log.1    <- most recent rotation
//! app.log.2
//! ...
//! app.log.N    <- oldest kept, N = backup_count
//! ```
//!
//! A rotation with `backup_count = 3` runs:
//!
//! ```text
//! remove  app.log.3
//! rename  app.log.2 -> app.log.3
//! rename  app.log.1 -> app.log.2
//! archive app.log   -> app.log.1
//! ```

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use crate::common::SinkError;

/// When to rotate and how many backups to keep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationPolicy {
    /// Rotate once the live file reaches this many bytes; 0 disables rotation
    pub max_file_size: u64,

    /// Number of rotated files kept next to the live file
    pub backup_count: usize,
}

impl RotationPolicy {
    pub const fn new(max_file_size: u64, backup_count: usize) -> Self {
        Self {
            max_file_size,
            backup_count,
        }
    }

    /// Rotation is enabled when a positive threshold is configured
    pub const fn is_enabled(&self) -> bool {
        self.max_file_size > 0
    }

    /// Check the live size against this policy's threshold
    #[inline]
    pub fn should_rotate(&self, current_size: u64) -> bool {
        should_rotate(current_size, self.max_file_size)
    }

    /// Plan the backup shift for the live file at `path`
    pub fn plan(&self, path: &Path) -> Vec<RotationStep> {
        plan_backup_shift(path, self.backup_count)
    }
}

/// True iff rotation is enabled and the live file has reached the threshold
#[inline]
pub fn should_rotate(current_size: u64, max_file_size: u64) -> bool {
    max_file_size > 0 && current_size >= max_file_size
}

/// Path of backup slot `index` (`app.log` -> `app.log.3`)
pub fn backup_path(path: &Path, index: usize) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(format!(".{index}"));
    PathBuf::from(name)
}

/// One filesystem action of a rotation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RotationStep {
    /// Delete the oldest backup so the chain never grows past its bound
    Discard(PathBuf),

    /// Move a backup one slot up; skipped when `from` does not exist
    Shift { from: PathBuf, to: PathBuf },

    /// Turn the live file into `path.1`, leaving an empty live file behind
    Archive { live: PathBuf, to: PathBuf },

    /// No backups kept: empty the live file in place
    Truncate(PathBuf),
}

impl fmt::Display for RotationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Discard(p) => write!(f, "discard {}", p.display()),
            Self::Shift { from, to } => write!(f, "shift {} -> {}", from.display(), to.display()),
            Self::Archive { live, to } => {
                write!(f, "archive {} -> {}", live.display(), to.display())
            }
            Self::Truncate(p) => write!(f, "truncate {}", p.display()),
        }
    }
}

/// Compute the ordered steps that shift the backup chain by one
///
/// Walks slots from `backup_count` down to 1 so that every rename lands on a
/// slot that has already been vacated.
pub fn plan_backup_shift(path: &Path, backup_count: usize) -> Vec<RotationStep> {
    if backup_count == 0 {
        return vec![RotationStep::Truncate(path.to_path_buf())];
    }

    let mut steps = Vec::with_capacity(backup_count + 1);
    steps.push(RotationStep::Discard(backup_path(path, backup_count)));

    for i in (1..=backup_count).rev() {
        if i == 1 {
            steps.push(RotationStep::Archive {
                live: path.to_path_buf(),
                to: backup_path(path, 1),
            });
        } else {
            steps.push(RotationStep::Shift {
                from: backup_path(path, i - 1),
                to: backup_path(path, i),
            });
        }
    }

    steps
}

/// Run a plan against the filesystem
///
/// Stops at the first failing step and returns its error. Completed steps are
/// not rolled back; the next rotation re-derives everything from what is on
/// disk. Missing sources are not failures.
///
/// Callers must have released any handle on the live file first.
pub fn execute_plan(steps: &[RotationStep]) -> Result<(), SinkError> {
    for step in steps {
        apply_step(step).map_err(|e| SinkError::rotate(step.to_string(), e))?;
    }
    Ok(())
}

fn apply_step(step: &RotationStep) -> io::Result<()> {
    match step {
        RotationStep::Discard(path) => remove_if_exists(path),
        RotationStep::Shift { from, to } => {
            if !from.exists() {
                return Ok(());
            }
            fs::rename(from, to)
        }
        RotationStep::Archive { live, to } => {
            if !live.exists() {
                return Ok(());
            }
            // Rename keeps the inode and is atomic; fall back to copy and
            // truncate where the platform refuses (e.g. file still mapped).
            match fs::rename(live, to) {
                Ok(()) => Ok(()),
                Err(rename_err) => {
                    tracing::debug!(
                        live = %live.display(),
                        error = %rename_err,
                        "rename failed, archiving by copy"
                    );
                    fs::copy(live, to)?;
                    truncate(live)
                }
            }
        }
        RotationStep::Truncate(path) => {
            if !path.exists() {
                return Ok(());
            }
            truncate(path)
        }
    }
}

fn remove_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

fn truncate(path: &Path) -> io::Result<()> {
    OpenOptions::new().write(true).truncate(true).open(path)?;
    Ok(())
}
