//! Collaborators shared by the sink components
//!
//! - **clock**: per-line timestamp source
//! - **diagnostics**: where swallowed failures are reported
//! - **rate_limited_logger**: keeps a failing disk from flooding the
//!   diagnostic output

pub mod clock;
pub mod diagnostics;
pub mod rate_limited_logger;

pub use clock::{Clock, SystemClock, TIMESTAMP_FORMAT};
pub use diagnostics::{Diagnostics, TracingDiagnostics};
pub use rate_limited_logger::{DEFAULT_LOG_INTERVAL, RateLimitedLogger};
