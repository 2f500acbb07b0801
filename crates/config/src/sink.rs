//! File sink configuration
//!
//! # Example
//!
//! ```toml
//! [sink]
//! path = "logs/app.log"
//! max_file_size = 5242880
//! backup_count = 3
//! persistent_handle = true
//! level = "info"
//! mirror = "stderr"
//! diagnostic_interval = "10s"
//! ```

use std::time::Duration;

use serde::Deserialize;
use spool_sinks::{DEFAULT_BACKUP_COUNT, DEFAULT_MAX_FILE_SIZE, Level};

/// Secondary console destination for written lines
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MirrorTarget {
    /// File only (default)
    #[default]
    None,
    /// Also echo to stdout
    Stdout,
    /// Also echo to stderr
    Stderr,
}

/// Rotating file sink configuration
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SinkConfig {
    /// Live log file path
    /// Required
    pub path: String,

    /// Rotation threshold in bytes, 0 disables rotation
    /// Default: 5 MiB
    pub max_file_size: u64,

    /// Rotated files kept as path.1 .. path.N
    /// Default: 3
    pub backup_count: usize,

    /// Keep the file open between writes
    /// Default: true
    pub persistent_handle: bool,

    /// Minimum level of events written to the file
    /// Default: info
    #[serde(deserialize_with = "crate::level::deserialize")]
    pub level: Level,

    /// Console mirror
    /// Default: none
    pub mirror: MirrorTarget,

    /// Minimum spacing between repeated failure diagnostics
    /// Default: 10s
    #[serde(with = "humantime_serde")]
    pub diagnostic_interval: Duration,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            path: String::new(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            backup_count: DEFAULT_BACKUP_COUNT,
            persistent_handle: true,
            level: Level::Info,
            mirror: MirrorTarget::None,
            diagnostic_interval: Duration::from_secs(10),
        }
    }
}
