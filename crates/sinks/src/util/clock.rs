//! Line timestamps
//!
//! The handle manager asks the clock for a fresh timestamp right before each
//! line is written, so a line's stamp reflects when it hit the file rather
//! than when its event was queued.

use chrono::Utc;

/// Timestamp format for written lines (ISO-8601, UTC, millisecond precision)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Source of per-line timestamps
pub trait Clock: Send + Sync {
    /// Render the current instant as the line prefix
    fn timestamp(&self) -> String;
}

/// Wall clock in UTC
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn timestamp(&self) -> String {
        Utc::now().format(TIMESTAMP_FORMAT).to_string()
    }
}

impl<F> Clock for F
where
    F: Fn() -> String + Send + Sync,
{
    fn timestamp(&self) -> String {
        self()
    }
}
