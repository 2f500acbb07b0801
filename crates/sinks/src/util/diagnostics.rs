//! Diagnostic channel for sink failures
//!
//! Producers never see I/O errors. Every failure inside the write path is
//! handed to a [`Diagnostics`] implementation instead, which by default
//! forwards it to `tracing` through a [`RateLimitedLogger`].

use std::time::Duration;

use super::rate_limited_logger::RateLimitedLogger;
use crate::common::SinkError;

/// Receiver of failures that the sink swallows
pub trait Diagnostics: Send + Sync {
    /// Report a failure. Must not panic and should not block for long.
    fn report(&self, failure: &SinkError);
}

/// Reports failures as rate-limited `tracing::error!` events
pub struct TracingDiagnostics {
    logger: RateLimitedLogger,
}

impl TracingDiagnostics {
    pub fn new(interval: Duration) -> Self {
        Self {
            logger: RateLimitedLogger::new(interval),
        }
    }

    /// Failures reported so far, emitted or not
    pub fn total_reported(&self) -> u64 {
        self.logger.total_error_count()
    }
}

impl Default for TracingDiagnostics {
    fn default() -> Self {
        Self {
            logger: RateLimitedLogger::default(),
        }
    }
}

impl Diagnostics for TracingDiagnostics {
    fn report(&self, failure: &SinkError) {
        self.logger.error(failure.kind(), failure);
    }
}
