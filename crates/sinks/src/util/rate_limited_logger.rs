//! Rate-limited failure reporting
//!
//! A disk that stays full makes every queued event fail the same way. This
//! logger emits at most one `tracing::error!` per interval and folds the
//! failures in between into a suppressed count.
//!
//! # Example
//!
//! ```ignore
//! use spool_sinks::util::RateLimitedLogger;
//! use std::time::Duration;
//!
//! let logger = RateLimitedLogger::new(Duration::from_secs(10));
//!
//! // Only the first call inside the window reaches tracing
//! for _ in 0..1000 {
//!     logger.error("write", &io_error);
//! }
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Default interval between two emitted errors
pub const DEFAULT_LOG_INTERVAL: Duration = Duration::from_secs(10);

/// Rate-limited error logger
///
/// Thread-safe: counters are atomic and the last emit time sits behind a
/// mutex.
pub struct RateLimitedLogger {
    /// Minimum interval between emitted errors
    min_interval: Duration,

    /// Last time an error was emitted
    last_log_time: Mutex<Option<Instant>>,

    /// Errors since the last emit
    error_count: AtomicU64,

    /// Errors ever recorded
    total_errors: AtomicU64,
}

impl RateLimitedLogger {
    /// Create a new rate-limited logger with the specified interval
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_log_time: Mutex::new(None),
            error_count: AtomicU64::new(0),
            total_errors: AtomicU64::new(0),
        }
    }

    /// Record an error and emit it if the interval has elapsed
    ///
    /// Returns true if the error was emitted, false if it was suppressed.
    pub fn error(&self, message: &str, error: &dyn std::fmt::Display) -> bool {
        self.error_count.fetch_add(1, Ordering::Relaxed);
        self.total_errors.fetch_add(1, Ordering::Relaxed);

        let should_log = {
            let mut last_time = self.last_log_time.lock();
            let now = Instant::now();

            match *last_time {
                None => {
                    *last_time = Some(now);
                    true
                }
                Some(last) if now.duration_since(last) >= self.min_interval => {
                    *last_time = Some(now);
                    true
                }
                _ => false,
            }
        };

        if !should_log {
            return false;
        }

        let count = self.error_count.swap(0, Ordering::Relaxed);
        let total = self.total_errors.load(Ordering::Relaxed);

        if count > 1 {
            tracing::error!(
                message = %message,
                error = %error,
                suppressed_count = count - 1,
                total_errors = total,
                "log sink failure (rate-limited)"
            );
        } else {
            tracing::error!(
                message = %message,
                error = %error,
                total_errors = total,
                "log sink failure"
            );
        }
        true
    }

    /// Errors recorded since the last emit
    #[cfg(test)]
    fn pending_error_count(&self) -> u64 {
        self.error_count.load(Ordering::Relaxed)
    }

    /// Errors ever recorded
    pub fn total_error_count(&self) -> u64 {
        self.total_errors.load(Ordering::Relaxed)
    }
}

impl Default for RateLimitedLogger {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_INTERVAL)
    }
}
